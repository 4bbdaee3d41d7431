use crate::engine::Board;
use crate::error::BoardError;
use crate::types::{GameResult, Move, Player};

/// Stones in a row needed to win.
pub const WIN_LENGTH: usize = 5;

pub trait RuleSet {
  fn validate(&self, board: &Board, mv: &Move) -> Result<(), BoardError>;
  fn check_win(&self, board: &Board, mv: &Move) -> Option<GameResult>;
}

/// Free placement, five or more in a row through the last stone wins.
pub struct StandardRuleSet;

impl RuleSet for StandardRuleSet {
  fn validate(&self, board: &Board, mv: &Move) -> Result<(), BoardError> {
    if !board.in_bounds(mv.row, mv.col) {
      return Err(BoardError::OutOfBounds {
        row: mv.row,
        col: mv.col,
      });
    }
    if !board.is_empty(mv.row, mv.col) {
      return Err(BoardError::Occupied {
        row: mv.row,
        col: mv.col,
      });
    }
    Ok(())
  }

  fn check_win(&self, board: &Board, mv: &Move) -> Option<GameResult> {
    let player = mv.player;
    let directions = [(0, 1), (1, 0), (1, 1), (1, -1)];

    for (dr, dc) in directions {
      let mut count = 1;
      count += count_dir(board, mv.row, mv.col, dr, dc, player);
      count += count_dir(board, mv.row, mv.col, -dr, -dc, player);

      if count >= WIN_LENGTH {
        return Some(GameResult::win_for(player));
      }
    }

    None
  }
}

fn count_dir(board: &Board, row: usize, col: usize, dr: i32, dc: i32, player: Player) -> usize {
  let mut count = 0;
  let mut cr = row as i32 + dr;
  let mut cc = col as i32 + dc;

  while cr >= 0 && cc >= 0 {
    let ur = cr as usize;
    let uc = cc as usize;
    if !board.in_bounds(ur, uc) {
      break;
    }
    if board.get(ur, uc) != Some(player) {
      break;
    }
    count += 1;
    cr += dr;
    cc += dc;
  }

  count
}
