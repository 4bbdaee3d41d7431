//! Lookup keys for 5×5 configurations.
//!
//! A `Configuration` is always held in store order: row-major, cell `i` at
//! local `(i / 5, i % 5)`, which the statistics tables expose as columns
//! `i11, i12, ..., i55`. Any producer that walks a window in another order
//! must go through [`CellOrder`] first.

use std::fmt;

use crate::symmetry::Symmetry;
use crate::types::{Player, WINDOW_CELLS, WINDOW_SIZE};

/// Traversal order of a flat 25-cell sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellOrder {
  /// Row by row, `i11, i12, ..., i15, i21, ...`. Store order.
  RowMajor,
  /// Column by column, `i11, i21, ..., i51, i12, ...`.
  ColumnMajor,
}

impl CellOrder {
  pub fn to_row_major(self, cells: &[u8; WINDOW_CELLS]) -> [u8; WINDOW_CELLS] {
    match self {
      CellOrder::RowMajor => *cells,
      // A column-major walk is the row-major walk of the transpose.
      CellOrder::ColumnMajor => Symmetry::MainDiagonal.apply(cells),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Configuration {
  cells: [u8; WINDOW_CELLS],
}

impl Configuration {
  pub fn empty() -> Self {
    Self {
      cells: [0; WINDOW_CELLS],
    }
  }

  /// Takes raw cell codes (`0` empty, `1` X, `2` O) walked in `order`.
  pub fn from_cells(cells: [u8; WINDOW_CELLS], order: CellOrder) -> Self {
    Self {
      cells: order.to_row_major(&cells),
    }
  }

  pub fn cells(&self) -> &[u8; WINDOW_CELLS] {
    &self.cells
  }

  pub fn get(&self, row: usize, col: usize) -> Option<Player> {
    Player::from_code(self.cells[row * WINDOW_SIZE + col])
  }

  /// Number of stones; the recorded move count can never be below this.
  pub fn occupied(&self) -> usize {
    self.cells.iter().filter(|&&code| code != 0).count()
  }

  pub fn with_stone(mut self, row: usize, col: usize, player: Player) -> Self {
    self.cells[row * WINDOW_SIZE + col] = player.code();
    self
  }

  pub fn transformed(&self, sym: Symmetry) -> Self {
    Self {
      cells: sym.apply(&self.cells),
    }
  }

  /// Occupied cells as `(column name, mark)` in store order.
  pub fn constraints(&self) -> Vec<(String, char)> {
    self
      .cells
      .iter()
      .enumerate()
      .filter_map(|(idx, &code)| Player::from_code(code).map(|p| (column_name(idx), p.mark())))
      .collect()
  }

  /// True when `self` agrees with every stone of `query`.
  pub fn contains(&self, query: &Configuration) -> bool {
    self
      .cells
      .iter()
      .zip(query.cells.iter())
      .all(|(&mine, &wanted)| wanted == 0 || mine == wanted)
  }
}

impl fmt::Display for Configuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, &code) in self.cells.iter().enumerate() {
      if idx > 0 && idx % WINDOW_SIZE == 0 {
        write!(f, "/")?;
      }
      let ch = Player::from_code(code).map(Player::mark).unwrap_or('.');
      write!(f, "{}", ch)?;
    }
    Ok(())
  }
}

/// Store column for a row-major cell index, 1-based: index 0 is `i11`.
pub fn column_name(index: usize) -> String {
  format!("i{}{}", index / WINDOW_SIZE + 1, index % WINDOW_SIZE + 1)
}

/// The lexicographically smallest of the eight symmetric images.
pub fn canonicalize(config: &Configuration) -> Configuration {
  Symmetry::ALL
    .iter()
    .map(|&sym| config.transformed(sym))
    .min()
    .unwrap_or(*config)
}
