//! The eight symmetries of the square.
//!
//! Canonicalization and pattern matching both enumerate this group, so it
//! lives here once. Every transform is a coordinate remapping applied to each
//! cell of a row-major `WINDOW_SIZE × WINDOW_SIZE` grid.

use crate::types::{WINDOW_CELLS, WINDOW_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symmetry {
  Identity,
  Rotate90,
  Rotate180,
  Rotate270,
  /// Mirror top to bottom.
  FlipRows,
  /// Mirror left to right.
  FlipCols,
  /// Mirror across the main diagonal (transpose).
  MainDiagonal,
  AntiDiagonal,
}

impl Symmetry {
  pub const ALL: [Symmetry; 8] = [
    Symmetry::Identity,
    Symmetry::Rotate90,
    Symmetry::Rotate180,
    Symmetry::Rotate270,
    Symmetry::FlipRows,
    Symmetry::FlipCols,
    Symmetry::MainDiagonal,
    Symmetry::AntiDiagonal,
  ];

  /// Where the cell at `(row, col)` of an `n × n` grid lands.
  pub fn map(self, row: usize, col: usize, n: usize) -> (usize, usize) {
    let last = n - 1;
    match self {
      Symmetry::Identity => (row, col),
      Symmetry::Rotate90 => (col, last - row),
      Symmetry::Rotate180 => (last - row, last - col),
      Symmetry::Rotate270 => (last - col, row),
      Symmetry::FlipRows => (last - row, col),
      Symmetry::FlipCols => (row, last - col),
      Symmetry::MainDiagonal => (col, row),
      Symmetry::AntiDiagonal => (last - col, last - row),
    }
  }

  /// Moves every cell of a row-major window to its image.
  pub fn apply<T: Copy>(self, cells: &[T; WINDOW_CELLS]) -> [T; WINDOW_CELLS] {
    let mut out = *cells;
    for (idx, &cell) in cells.iter().enumerate() {
      let (row, col) = self.map(idx / WINDOW_SIZE, idx % WINDOW_SIZE, WINDOW_SIZE);
      out[row * WINDOW_SIZE + col] = cell;
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn numbered() -> [u8; WINDOW_CELLS] {
    let mut cells = [0u8; WINDOW_CELLS];
    for (idx, cell) in cells.iter_mut().enumerate() {
      *cell = idx as u8;
    }
    cells
  }

  #[test]
  fn every_transform_is_a_permutation() {
    for sym in Symmetry::ALL {
      let mut seen = [false; WINDOW_CELLS];
      for &cell in sym.apply(&numbered()).iter() {
        assert!(!seen[cell as usize], "{:?} maps two cells to one", sym);
        seen[cell as usize] = true;
      }
    }
  }

  #[test]
  fn transforms_are_distinct() {
    let images: Vec<_> = Symmetry::ALL.iter().map(|sym| sym.apply(&numbered())).collect();
    for i in 0..images.len() {
      for j in (i + 1)..images.len() {
        assert_ne!(images[i], images[j]);
      }
    }
  }

  #[test]
  fn four_quarter_turns_are_identity() {
    let mut cells = numbered();
    for _ in 0..4 {
      cells = Symmetry::Rotate90.apply(&cells);
    }
    assert_eq!(cells, numbered());
  }

  #[test]
  fn rotate90_moves_top_left_to_top_right() {
    let rotated = Symmetry::Rotate90.apply(&numbered());
    assert_eq!(rotated[WINDOW_SIZE - 1], 0);
  }
}
