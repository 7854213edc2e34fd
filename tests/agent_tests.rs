use std::path::Path;

use tilechain::config::{EngineConfig, ProfilePolicy};
use tilechain::{fallback_pair, Agent, Board, Cell, Evaluator, FeatureWeights, GameOutcome, SelectOutcome};

fn config_in(dir: &Path) -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.paths.moves = dir.join("moves.json");
    cfg.paths.positions = dir.join("seen.json");
    cfg.paths.profiles = dir.join("orders.json");
    cfg.profiles.base_lengths = vec![2, 3, 4];
    cfg
}

fn pair_board() -> Board {
    Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]])
}

fn cell(r: usize, c: usize) -> Cell {
    Cell::new(r, c).unwrap()
}

#[test]
fn decide_caches_per_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::open(config_in(dir.path()));
    let b = pair_board();

    let first = agent.decide(&b);
    assert!(first.new_position);
    assert!(!first.from_cache);
    assert_eq!(first.chain().map(|c| c.cells().to_vec()), Some(vec![cell(0, 0), cell(0, 1)]));
    assert!(agent.pending().is_some());

    let second = agent.decide(&b);
    assert!(!second.new_position);
    assert!(second.from_cache);
    assert_eq!(second.outcome, first.outcome);
    assert_eq!(agent.cache().stats().hits, 1);
}

#[test]
fn failed_move_is_blacklisted_and_uncached() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::open(config_in(dir.path()));
    let b = pair_board();

    let d = agent.decide(&b);
    let rec = agent.report_outcome(false).expect("pending move");
    assert_eq!(rec.success, Some(false));
    assert_eq!(rec.fingerprint, d.fingerprint);
    assert!(agent.stores().moves.is_blacklisted(d.fingerprint, &rec.key));
    assert!(agent.pending().is_none());

    let again = agent.decide(&b);
    assert!(!again.from_cache, "a failed choice must not be served from cache");
    assert_eq!(again.outcome, SelectOutcome::AllBlacklisted);
    assert!(agent.pending().is_none());
}

#[test]
fn only_high_scoring_successes_are_ranked() {
    let dir = tempfile::tempdir().unwrap();
    let b = pair_board();

    let mut agent = Agent::open(config_in(dir.path()));
    let d = agent.decide(&b);
    agent.report_outcome(true);
    assert!(agent.stores().moves.good_moves(d.fingerprint).is_empty(), "score is below 5000");

    let mut cfg = config_in(dir.path());
    cfg.memory.good_move_min_score = 0.0;
    let mut agent = Agent::open(cfg);
    let d = agent.decide(&b);
    let rec = agent.report_outcome(true).expect("pending move");
    let good = agent.stores().moves.good_moves(d.fingerprint);
    assert_eq!(good.len(), 1);
    assert_eq!(good[0].key, rec.key);
    assert!(agent.report_outcome(true).is_none(), "feedback is consumed once");
}

#[test]
fn finish_game_applies_policy() {
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_in(dir.path());
    cfg.profiles.policy = ProfilePolicy::Cycle;
    let mut agent = Agent::open(cfg);
    agent.finish_game(GameOutcome::new(100.0, false, 30.0));
    assert_eq!(agent.stores().profiles.current_index, 1);
    assert_eq!(agent.stores().profiles.stats(0).games, 1);

    let mut cfg = config_in(dir.path());
    cfg.profiles.policy = ProfilePolicy::Fixed;
    let mut agent = Agent::open(cfg);
    agent.finish_game(GameOutcome::new(100.0, false, 30.0));
    assert_eq!(agent.stores().profiles.current_index, 0);

    let mut agent = Agent::open(config_in(dir.path()));
    agent.stores_mut().profiles.select(4);
    agent.stores_mut().profiles.record_game(2, GameOutcome::new(9000.0, true, 10.0));
    agent.finish_game(GameOutcome::new(10.0, false, 300.0));
    assert_eq!(agent.stores().profiles.current_index, 2, "recommend switches to the best profile");
}

#[test]
fn save_and_reopen_restores_stores() {
    let dir = tempfile::tempdir().unwrap();
    let b = pair_board();
    let fp;
    {
        let mut agent = Agent::open(config_in(dir.path()));
        fp = agent.decide(&b).fingerprint;
        agent.report_outcome(false);
        agent.finish_game(GameOutcome::new(500.0, false, 20.0));
        agent.save().unwrap();
    }
    let agent = Agent::open(config_in(dir.path()));
    assert!(agent.stores().positions.was_seen(fp));
    assert_eq!(agent.stores().moves.bad_moves(fp).len(), 1);
    assert_eq!(agent.stores().profiles.stats(0).games, 1);
    assert_eq!(agent.stores().profiles.len(), 6);
}

#[test]
fn fallback_pair_picks_orthogonal_neighbors() {
    // 2 next to 4: compatible, but no chain may open on it.
    let b = Board::from_rows([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4], [0; 4]]);
    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::open(config_in(dir.path()));
    assert_eq!(agent.decide(&b).outcome, SelectOutcome::NoChains);

    let sel = agent.fallback(&b).expect("pair");
    assert_eq!(sel.chain.cells(), &[cell(0, 0), cell(0, 1)]);
    assert_eq!(agent.pending().map(|p| p.key), Some(sel.key));

    assert!(fallback_pair(&Board::new(), &Evaluator::default()).is_none());
    let lonely = Board::from_rows([[2, 0, 0, 0], [0, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
    assert!(fallback_pair(&lonely, &Evaluator::default()).is_none(), "diagonals do not count");
}

#[test]
fn lost_board_detection() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Agent::open(config_in(dir.path()));
    let lost = Board::from_rows([
        [1, 3, 5, 7],
        [9, 11, 13, 15],
        [17, 19, 21, 23],
        [25, 27, 29, 31],
        [33, 35, 37, 39],
    ]);
    assert!(agent.is_game_lost(&lost));
    assert!(!agent.is_game_lost(&pair_board()));

    let mut full_with_pair = lost;
    full_with_pair.set(cell(0, 1), 2);
    assert!(!agent.is_game_lost(&full_with_pair), "1 and 2 can still merge");
}

#[test]
fn adaptive_cycle_credits_the_profile_that_played() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.profiles.policy = ProfilePolicy::Cycle;
    assert!(cfg.profiles.adaptive);
    let mut agent = Agent::open(cfg);
    let b = pair_board();

    let d1 = agent.decide(&b);
    assert_eq!(d1.profile_index, 0);
    assert_eq!(d1.order, vec![2, 3, 4]);
    agent.finish_game(GameOutcome::new(100.0, false, 30.0));
    assert_eq!(agent.stores().profiles.current_index, 1);

    let d2 = agent.decide(&b);
    assert_eq!(d2.profile_index, 1, "game two plays the cycled profile");
    assert_eq!(d2.order, vec![2, 4, 3]);
    agent.finish_game(GameOutcome::new(200.0, false, 30.0));

    let p = &agent.stores().profiles;
    assert_eq!(p.stats(0).games, 1);
    assert_eq!(p.stats(1).games, 1);
    assert_eq!(p.stats(1).total_score, 200.0);
    assert_eq!(p.current_index, 2);
}

#[test]
fn adaptive_fixed_credits_the_selected_profile() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.profiles.policy = ProfilePolicy::Fixed;
    let mut agent = Agent::open(cfg);
    agent.stores_mut().profiles.select(3);

    let d = agent.decide(&pair_board());
    assert_eq!(d.profile_index, 3);
    assert_eq!(d.order, vec![3, 4, 2]);
    agent.finish_game(GameOutcome::new(700.0, true, 12.0));

    let p = &agent.stores().profiles;
    assert_eq!(p.stats(3).games, 1);
    assert_eq!(p.stats(3).wins, 1);
    assert_eq!(p.stats(0).games, 0);
    assert_eq!(p.current_index, 3);
}

#[test]
fn finished_games_learn_weights_and_fill_session_stats() {
    let dir = tempfile::tempdir().unwrap();
    let b = pair_board();

    let mut cfg = config_in(dir.path());
    cfg.profiles.learn_weights = true;
    let mut agent = Agent::open(cfg);
    agent.decide(&b);
    let mut out = GameOutcome::new(300.0, false, 15.0);
    out.moves = 12;
    out.max_tile = 64;
    agent.finish_game(out);

    let p = &agent.stores().profiles;
    assert_ne!(p.feature_weights, FeatureWeights::default(), "a lost game shifts the weights");
    let sum: f64 = p.feature_weights.as_array().iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(p.session.total_games, 1);
    assert_eq!(p.session.total_moves, 12);
    assert_eq!(p.session.max_tile, 64);

    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::open(config_in(dir.path()));
    assert!(!agent.config().profiles.learn_weights, "static weighting by default");
    agent.decide(&b);
    agent.finish_game(GameOutcome::new(300.0, true, 15.0));
    assert_eq!(agent.stores().profiles.feature_weights, FeatureWeights::default());
    assert_eq!(agent.stores().profiles.session.total_wins, 1);
}
