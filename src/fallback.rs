//! What a caller plays when the selector reports no move.

use rand::Rng;

use crate::engine::Board;
use crate::types::Coord;

const PROBES: usize = 100;
const PROBE_SPAN: i64 = 3;

/// A random empty cell within three rows and columns of `last_move`, or the
/// nearest empty cell once the probes run out. `None` only on a full board.
pub fn random_nearby<R: Rng>(board: &Board, last_move: Coord, rng: &mut R) -> Option<Coord> {
  let size = board.size() as i64;
  for _ in 0..PROBES {
    let row = last_move.row as i64 + rng.gen_range(-PROBE_SPAN..=PROBE_SPAN);
    let col = last_move.col as i64 + rng.gen_range(-PROBE_SPAN..=PROBE_SPAN);
    if row < 0 || col < 0 || row >= size || col >= size {
      continue;
    }
    let (row, col) = (row as usize, col as usize);
    if board.is_empty(row, col) {
      return Some(Coord { row, col });
    }
  }
  nearest_empty(board, last_move)
}

/// Closest empty cell by Chebyshev distance, first in row-major order on ties.
pub fn nearest_empty(board: &Board, from: Coord) -> Option<Coord> {
  board
    .empty_coords()
    .into_iter()
    .min_by_key(|c| c.row.abs_diff(from.row).max(c.col.abs_diff(from.col)))
}
