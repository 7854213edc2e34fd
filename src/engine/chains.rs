use crate::board::Board;
use crate::chain::Chain;
use crate::types::{Cell, Dir};

/// Work-list frame: path so far, the running value and the visited cells.
struct Frame {
    path: Vec<Cell>,
    value: i32,
    visited: u32,
}

/// Every chain on the board, sub-chains included.
///
/// A chain starts on two equal tiles; each later step lands on a tile equal to
/// the running value or exactly double it, and the running value follows.
/// Start cells are visited row-major, neighbors in [`Dir::all`] order.
pub fn enumerate_chains(board: &Board) -> Vec<Chain> {
    let mut out = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (start, start_val) in board.iter() {
        if start_val <= 0 {
            continue;
        }
        stack.push(Frame { path: vec![start], value: start_val, visited: start.bit() });

        while let Some(frame) = stack.pop() {
            if frame.path.len() >= 2 {
                out.push(Chain::from_parts(frame.path.clone(), frame.visited));
            }

            let last = frame.path[frame.path.len() - 1];
            let opening = frame.path.len() == 1;
            for dir in Dir::all() {
                let Some(next) = last.step(dir) else {
                    continue;
                };
                if frame.visited & next.bit() != 0 {
                    continue;
                }
                let v = board.get(next);
                if v <= 0 {
                    continue;
                }
                // The opening step must pair equal tiles.
                let fits = if opening {
                    v == frame.value
                } else {
                    v == frame.value || Some(v) == frame.value.checked_mul(2)
                };
                if !fits {
                    continue;
                }
                let mut path = Vec::with_capacity(frame.path.len() + 1);
                path.extend_from_slice(&frame.path);
                path.push(next);
                stack.push(Frame { path, value: v, visited: frame.visited | next.bit() });
            }
        }
    }
    out
}

/// Keep only chains whose cell set is not covered by a longer kept chain.
/// Output is longest-first; equal lengths keep their input order.
pub fn filter_maximal(mut chains: Vec<Chain>) -> Vec<Chain> {
    chains.sort_by(|a, b| b.len().cmp(&a.len()));
    let mut kept: Vec<Chain> = Vec::new();
    for chain in chains {
        let m = chain.mask();
        if kept.iter().any(|k| m & !k.mask() == 0) {
            continue;
        }
        kept.push(chain);
    }
    kept
}

/// Enumerate then filter: the candidate set used by the selector.
#[inline]
pub fn find_chains(board: &Board) -> Vec<Chain> {
    filter_maximal(enumerate_chains(board))
}
