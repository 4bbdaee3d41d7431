//! Fixed-size views of the large board.
//!
//! A window is always fully on the board: anchors near an edge are pulled
//! inward instead of letting the window hang off. Local coordinates map to
//! global ones by adding the window origin.

use crate::canonical::{CellOrder, Configuration};
use crate::engine::Board;
use crate::symmetry::Symmetry;
use crate::types::{cell_code, Coord, Player, WINDOW_CELLS, WINDOW_SIZE};

const HALF: usize = WINDOW_SIZE / 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
  /// Row-major `[local_row * WINDOW_SIZE + local_col]`.
  cells: [Option<Player>; WINDOW_CELLS],
  origin: Coord,
}

impl Window {
  pub fn cells(&self) -> &[Option<Player>; WINDOW_CELLS] {
    &self.cells
  }

  /// Global coordinate of local `(0, 0)`.
  pub fn origin(&self) -> Coord {
    self.origin
  }

  pub fn get(&self, local_row: usize, local_col: usize) -> Option<Player> {
    self.cells[local_row * WINDOW_SIZE + local_col]
  }

  pub fn to_global(&self, local_row: usize, local_col: usize) -> Coord {
    Coord {
      row: self.origin.row + local_row,
      col: self.origin.col + local_col,
    }
  }

  pub fn to_local(&self, global: Coord) -> Option<(usize, usize)> {
    let row = global.row.checked_sub(self.origin.row)?;
    let col = global.col.checked_sub(self.origin.col)?;
    if row < WINDOW_SIZE && col < WINDOW_SIZE {
      Some((row, col))
    } else {
      None
    }
  }

  /// Empty local cells, row-major.
  pub fn empty_cells(&self) -> Vec<(usize, usize)> {
    (0..WINDOW_CELLS)
      .filter(|&idx| self.cells[idx].is_none())
      .map(|idx| (idx / WINDOW_SIZE, idx % WINDOW_SIZE))
      .collect()
  }

  pub fn stone_count(&self) -> usize {
    self.cells.iter().filter(|cell| cell.is_some()).count()
  }

  /// The window serialized in store order.
  pub fn configuration(&self) -> Configuration {
    let mut codes = [0u8; WINDOW_CELLS];
    for (code, cell) in codes.iter_mut().zip(self.cells.iter()) {
      *code = cell_code(*cell);
    }
    // Windows are extracted row-major, which is already store order.
    Configuration::from_cells(codes, CellOrder::RowMajor)
  }

  /// Same origin, cells moved by `sym`.
  pub fn transformed(&self, sym: Symmetry) -> Window {
    Window {
      cells: sym.apply(&self.cells),
      origin: self.origin,
    }
  }
}

/// First row (or column) of a window centred on `center`, clamped so that
/// the window stays on a board of `board_size`. `None` when the board is
/// smaller than a window.
pub fn clamp_origin(center: usize, board_size: usize) -> Option<usize> {
  if board_size < WINDOW_SIZE {
    return None;
  }
  Some(center.saturating_sub(HALF).min(board_size - WINDOW_SIZE))
}

/// The window centred on `center`, shifted inward near the edges.
pub fn extract_window(board: &Board, center: Coord) -> Option<Window> {
  let origin = Coord {
    row: clamp_origin(center.row, board.size())?,
    col: clamp_origin(center.col, board.size())?,
  };
  window_at(board, origin)
}

/// The window whose local `(0, 0)` sits at `origin`.
pub fn window_at(board: &Board, origin: Coord) -> Option<Window> {
  let size = board.size();
  if origin.row + WINDOW_SIZE > size || origin.col + WINDOW_SIZE > size {
    return None;
  }
  let mut cells = [None; WINDOW_CELLS];
  for (idx, cell) in cells.iter_mut().enumerate() {
    *cell = board.get(origin.row + idx / WINDOW_SIZE, origin.col + idx % WINDOW_SIZE);
  }
  Some(Window { cells, origin })
}

/// Every window origin on the board, column-outer then row-inner. The order
/// is the tie-break order of the window search.
pub fn anchors(board_size: usize) -> Vec<Coord> {
  if board_size < WINDOW_SIZE {
    return Vec::new();
  }
  let span = board_size - WINDOW_SIZE + 1;
  let mut out = Vec::with_capacity(span * span);
  for col in 0..span {
    for row in 0..span {
      out.push(Coord { row, col });
    }
  }
  out
}

/// Chebyshev distance from `point` to the centre of the window at `origin`.
pub fn center_distance(origin: Coord, point: Coord) -> usize {
  let center_row = origin.row + HALF;
  let center_col = origin.col + HALF;
  center_row.abs_diff(point.row).max(center_col.abs_diff(point.col))
}
