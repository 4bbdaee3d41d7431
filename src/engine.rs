use std::fmt;

use crate::error::BoardError;
use crate::rules::{RuleSet, StandardRuleSet};
use crate::types::{cell_code, Coord, GameResult, Move, Player};

/// Dense square board snapshot. The selector only ever reads it; hypothetical
/// stones are placed on copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
  size: usize,
  cells: Vec<Option<Player>>,
}

impl Board {
  pub fn new(size: usize) -> Self {
    Self {
      size,
      cells: vec![None; size * size],
    }
  }

  /// Parses the `0 = empty, 1 = X, 2 = O` row arrays the game server sends.
  pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, BoardError> {
    let size = rows.len();
    let mut board = Board::new(size);
    for (row, values) in rows.iter().enumerate() {
      if values.len() != size {
        return Err(BoardError::NotSquare {
          row,
          len: values.len(),
          size,
        });
      }
      for (col, &value) in values.iter().enumerate() {
        match value {
          0 => {}
          code => {
            let player = Player::from_code(code).ok_or(BoardError::Cell { row, col, value })?;
            board.set(Coord { row, col }, player);
          }
        }
      }
    }
    Ok(board)
  }

  pub fn to_rows(&self) -> Vec<Vec<u8>> {
    (0..self.size)
      .map(|row| (0..self.size).map(|col| cell_code(self.get(row, col))).collect())
      .collect()
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn in_bounds(&self, row: usize, col: usize) -> bool {
    row < self.size && col < self.size
  }

  fn index(&self, row: usize, col: usize) -> usize {
    row * self.size + col
  }

  pub fn get(&self, row: usize, col: usize) -> Option<Player> {
    if !self.in_bounds(row, col) {
      return None;
    }
    self.cells[self.index(row, col)]
  }

  pub fn set(&mut self, coord: Coord, player: Player) {
    let idx = self.index(coord.row, coord.col);
    self.cells[idx] = Some(player);
  }

  pub fn is_empty(&self, row: usize, col: usize) -> bool {
    self.in_bounds(row, col) && self.get(row, col).is_none()
  }

  pub fn is_full(&self) -> bool {
    self.cells.iter().all(|cell| cell.is_some())
  }

  pub fn stone_count(&self) -> usize {
    self.cells.iter().filter(|cell| cell.is_some()).count()
  }

  pub fn empty_coords(&self) -> Vec<Coord> {
    let mut coords = Vec::with_capacity(self.cells.len());
    for row in 0..self.size {
      for col in 0..self.size {
        if self.get(row, col).is_none() {
          coords.push(Coord { row, col });
        }
      }
    }
    coords
  }
}

impl fmt::Display for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "   ")?;
    for col in 0..self.size {
      write!(f, "{:>2} ", col)?;
    }
    writeln!(f)?;
    for row in 0..self.size {
      write!(f, "{:>2} ", row)?;
      for col in 0..self.size {
        let ch = match self.get(row, col) {
          None => '.',
          Some(player) => player.mark(),
        };
        write!(f, " {} ", ch)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

/// Owner of the mutable board for a running game (self-play and tests).
#[derive(Clone, Debug)]
pub struct GameState {
  pub board: Board,
  pub to_move: Player,
  pub moves: Vec<Move>,
  pub result: Option<GameResult>,
}

impl GameState {
  pub fn new(board_size: usize) -> Self {
    Self {
      board: Board::new(board_size),
      to_move: Player::X,
      moves: Vec::new(),
      result: None,
    }
  }

  pub fn last_move(&self) -> Option<Coord> {
    self.moves.last().map(|mv| Coord {
      row: mv.row,
      col: mv.col,
    })
  }

  pub fn apply_move(&mut self, row: usize, col: usize) -> Result<(), BoardError> {
    if self.result.is_some() {
      return Err(BoardError::Finished);
    }
    let mv = Move {
      row,
      col,
      player: self.to_move,
    };

    let rules = StandardRuleSet;
    rules.validate(&self.board, &mv)?;

    self.board.set(
      Coord {
        row: mv.row,
        col: mv.col,
      },
      mv.player,
    );
    self.moves.push(mv);

    if let Some(result) = rules.check_win(&self.board, &mv) {
      self.result = Some(result);
      return Ok(());
    }

    if self.board.is_full() {
      self.result = Some(GameResult::Draw);
      return Ok(());
    }

    self.to_move = self.to_move.other();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rows_round_trip_through_board() {
    let rows = vec![vec![0, 1, 0], vec![2, 0, 0], vec![0, 0, 1]];
    let board = Board::from_rows(&rows).unwrap();
    assert_eq!(board.get(0, 1), Some(Player::X));
    assert_eq!(board.get(1, 0), Some(Player::O));
    assert_eq!(board.stone_count(), 3);
    assert_eq!(board.to_rows(), rows);
  }

  #[test]
  fn ragged_rows_are_rejected() {
    let rows = vec![vec![0, 0], vec![0]];
    assert_eq!(
      Board::from_rows(&rows),
      Err(BoardError::NotSquare {
        row: 1,
        len: 1,
        size: 2
      })
    );
  }

  #[test]
  fn unknown_cell_values_are_rejected() {
    let rows = vec![vec![0, 3], vec![0, 0]];
    assert_eq!(
      Board::from_rows(&rows),
      Err(BoardError::Cell {
        row: 0,
        col: 1,
        value: 3
      })
    );
  }

  #[test]
  fn out_of_bounds_reads_are_empty() {
    let board = Board::new(5);
    assert_eq!(board.get(5, 0), None);
    assert!(!board.is_empty(0, 5));
  }

  #[test]
  fn game_alternates_and_detects_five() {
    let mut game = GameState::new(10);
    for col in 0..4 {
      game.apply_move(0, col).unwrap();
      game.apply_move(1, col).unwrap();
    }
    assert_eq!(game.result, None);
    game.apply_move(0, 4).unwrap();
    assert_eq!(game.result, Some(GameResult::XWin));
    assert_eq!(game.apply_move(5, 5), Err(BoardError::Finished));
  }

  #[test]
  fn occupied_cells_cannot_be_played() {
    let mut game = GameState::new(5);
    game.apply_move(2, 2).unwrap();
    assert_eq!(
      game.apply_move(2, 2),
      Err(BoardError::Occupied { row: 2, col: 2 })
    );
    assert_eq!(game.to_move, Player::O);
    assert_eq!(game.last_move(), Some(Coord::new(2, 2)));
  }
}
