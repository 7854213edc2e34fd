use rand::Rng;
use rand_pcg::Pcg64;
use rand::SeedableRng;

use tilechain::{
    enumerate_chains, filter_maximal, find_chains, Board, Cell, Chain, Evaluator, Weights,
};

fn cell(r: usize, c: usize) -> Cell {
    Cell::new(r, c).unwrap()
}

fn sparse_board(seed: u64) -> Board {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut b = Board::new();
    for idx in 0..tilechain::CELLS {
        if rng.gen_bool(0.5) {
            let v = 2i32 << rng.gen_range(0..5);
            b.set(Cell::from_index(idx), v);
        }
    }
    b
}

fn chebyshev(a: Cell, b: Cell) -> u8 {
    a.row.abs_diff(b.row).max(a.col.abs_diff(b.col))
}

#[test]
fn empty_board_has_no_chains() {
    let b = Board::new();
    assert!(enumerate_chains(&b).is_empty());
    assert!(find_chains(&b).is_empty());

    // Non-positive values count as empty too
    let neg = Board::from_rows([[-1, -1, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    assert!(enumerate_chains(&neg).is_empty());
}

#[test]
fn single_pair_yields_one_chain_after_filter() {
    let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let raw = enumerate_chains(&b);
    assert_eq!(raw.len(), 2, "both directions are enumerated");

    let kept = filter_maximal(raw);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].cells(), &[cell(0, 0), cell(0, 1)]);
}

#[test]
fn no_adjacent_compatible_cells_yields_nothing() {
    // Odd values: no two are equal and none is double another.
    let b = Board::from_rows([
        [1, 3, 5, 7],
        [9, 11, 13, 15],
        [17, 19, 21, 23],
        [25, 27, 29, 31],
        [33, 35, 37, 39],
    ]);
    assert!(enumerate_chains(&b).is_empty());
}

#[test]
fn opening_step_requires_equal_values() {
    // 2 -> 4 is compatible but a chain may not open on a doubling.
    let b = Board::from_rows([[2, 4, 8, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    assert!(enumerate_chains(&b).is_empty());
}

#[test]
fn running_value_follows_doublings() {
    let b = Board::from_rows([[2, 2, 4, 8], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let kept = find_chains(&b);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].cells(), &[cell(0, 0), cell(0, 1), cell(0, 2), cell(0, 3)]);

    // After 2,2,4 the running value is 4, so a trailing 2 is rejected.
    let back = Board::from_rows([[2, 2, 4, 2], [0; 4], [0; 4], [0; 4], [0; 4]]);
    assert!(find_chains(&back).iter().all(|c| !c.contains(cell(0, 3))));
}

#[test]
fn diagonal_steps_are_allowed() {
    let b = Board::from_rows([[8, 0, 0, 0], [0, 8, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let kept = find_chains(&b);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].cells(), &[cell(0, 0), cell(1, 1)]);
    assert!(kept[0].is_straight());
}

#[test]
fn enumerated_chains_obey_merge_rules() {
    for seed in 0..24u64 {
        let b = sparse_board(seed);
        for chain in enumerate_chains(&b) {
            let cells = chain.cells();
            assert!(cells.len() >= 2);
            let vals: Vec<i32> = chain.values(&b).collect();
            assert_eq!(vals[0], vals[1], "seed {seed}: chain {chain} does not open on equal tiles");
            let mut running = vals[1];
            for (w, &v) in cells.windows(2).zip(vals.iter().skip(1)) {
                assert_eq!(chebyshev(w[0], w[1]), 1, "seed {seed}: {chain} has a gap");
                assert!(v == running || v == running * 2, "seed {seed}: {chain} breaks the value trail");
                running = v;
            }
            let mut mask = 0u32;
            for c in cells {
                assert_eq!(mask & c.bit(), 0, "seed {seed}: {chain} repeats a cell");
                mask |= c.bit();
            }
            assert_eq!(mask, chain.mask());
        }
    }
}

#[test]
fn filter_leaves_no_contained_chain() {
    for seed in 0..24u64 {
        let kept = find_chains(&sparse_board(seed));
        for (i, a) in kept.iter().enumerate() {
            for (j, b) in kept.iter().enumerate() {
                if i == j {
                    continue;
                }
                assert!(
                    a.mask() & !b.mask() != 0,
                    "seed {seed}: {a} is covered by {b}"
                );
            }
        }
        assert!(kept.windows(2).all(|w| w[0].len() >= w[1].len()), "seed {seed}: not longest-first");
    }
}

#[test]
fn chain_rejects_short_or_repeating_paths() {
    assert!(Chain::new(vec![cell(0, 0)]).is_none());
    assert!(Chain::new(vec![cell(0, 0), cell(0, 1), cell(0, 0)]).is_none());
    let ch = Chain::new(vec![cell(1, 1), cell(1, 2), cell(2, 2)]).unwrap();
    let k = ch.key();
    assert_eq!((k.length, k.start, k.end), (3, cell(1, 1), cell(2, 2)));
    assert!(!ch.is_straight());
}

#[test]
fn chain_serializes_as_cell_list() {
    let ch = Chain::new(vec![cell(0, 0), cell(0, 1)]).unwrap();
    let json = serde_json::to_string(&ch).unwrap();
    assert_eq!(json, r#"[{"row":0,"col":0},{"row":0,"col":1}]"#);
    let back: Chain = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ch);
    assert!(serde_json::from_str::<Chain>(r#"[{"row":0,"col":0}]"#).is_err());
}

#[test]
fn score_is_pure() {
    let b = Board::from_rows([[2, 2, 4, 0], [8, 8, 0, 0], [0, 16, 0, 0], [0; 4], [128, 0, 0, 0]]);
    let ev = Evaluator::default();
    for ch in find_chains(&b) {
        let s1 = ev.score(&b, &ch);
        let s2 = ev.score(&b, &ch);
        assert_eq!(s1.to_bits(), s2.to_bits(), "score of {ch} is not stable");
        assert_eq!(ev.breakdown(&b, &ch).total().to_bits(), s1.to_bits());
    }
}

#[test]
fn score_increases_with_tile_values() {
    let ch = Chain::new(vec![cell(0, 0), cell(0, 1)]).unwrap();
    let small = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let big = Board::from_rows([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let ev = Evaluator::default();
    let d = ev.score(&big, &ch) - ev.score(&small, &ch);
    assert!((d - 4.0).abs() < 1e-9, "expected the base term alone to differ, got {d}");
}

#[test]
fn weights_drive_the_score() {
    let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let ch = Chain::new(vec![cell(0, 0), cell(0, 1)]).unwrap();
    let base = Evaluator::default().score(&b, &ch);
    let heavier = Evaluator::new(Weights { length_bonus: 150.0, ..Weights::default() }).score(&b, &ch);
    assert!((heavier - base - 100.0).abs() < 1e-9);
}

#[test]
fn long_chains_pay_the_soft_cap() {
    let b = Board::from_rows([[2, 2, 2, 2], [2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let ch = Chain::new(vec![cell(0, 3), cell(0, 2), cell(0, 1), cell(0, 0), cell(1, 0), cell(1, 1)]).unwrap();
    let bd = Evaluator::default().breakdown(&b, &ch);
    assert_eq!(bd.length_penalty, 40.0);
    assert_eq!(bd.length, 600.0);
    assert_eq!(bd.small_tiles, 600.0);
}

#[test]
fn isolating_a_big_tile_is_penalized() {
    let ch = Chain::new(vec![cell(0, 0), cell(0, 1)]).unwrap();
    let alone = Board::from_rows([[256, 256, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let twin = Board::from_rows([[256, 256, 0, 0], [0; 4], [0; 4], [0; 4], [0, 0, 0, 256]]);
    let ev = Evaluator::default();
    // 30 * (256 / 128) for each of the two cells
    assert_eq!(ev.breakdown(&alone, &ch).isolation_penalty, 120.0);
    assert_eq!(ev.breakdown(&twin, &ch).isolation_penalty, 0.0);
}

#[test]
fn off_board_cells_fail_to_deserialize() {
    assert!(serde_json::from_str::<Cell>(r#"{"row":4,"col":3}"#).is_ok());
    assert!(serde_json::from_str::<Cell>(r#"{"row":5,"col":0}"#).is_err());
    assert!(serde_json::from_str::<Cell>(r#"{"row":0,"col":4}"#).is_err());
    let far = serde_json::from_str::<Chain>(r#"[{"row":200,"col":0},{"row":0,"col":1}]"#);
    assert!(far.is_err(), "chain with an off-board cell must be an error, got {far:?}");
    let key = serde_json::from_str::<tilechain::MoveKey>(
        r#"{"length":2,"start":{"row":0,"col":0},"end":{"row":9,"col":9}}"#,
    );
    assert!(key.is_err());
}
