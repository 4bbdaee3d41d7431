use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side length of the sub-board the statistics corpus was recorded on.
pub const WINDOW_SIZE: usize = 5;
pub const WINDOW_CELLS: usize = WINDOW_SIZE * WINDOW_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Player {
  X,
  O,
}

impl Player {
  pub fn other(self) -> Self {
    match self {
      Player::X => Player::O,
      Player::O => Player::X,
    }
  }

  /// Cell code used by board payloads and configurations: X = 1, O = 2.
  pub fn code(self) -> u8 {
    match self {
      Player::X => 1,
      Player::O => 2,
    }
  }

  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      1 => Some(Player::X),
      2 => Some(Player::O),
      _ => None,
    }
  }

  pub fn mark(self) -> char {
    match self {
      Player::X => 'X',
      Player::O => 'O',
    }
  }
}

impl fmt::Display for Player {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.mark())
  }
}

impl FromStr for Player {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "X" | "x" | "1" => Ok(Player::X),
      "O" | "o" | "2" => Ok(Player::O),
      other => Err(format!("unknown player '{other}', expected X or O")),
    }
  }
}

pub fn cell_code(cell: Option<Player>) -> u8 {
  cell.map(Player::code).unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameResult {
  XWin,
  OWin,
  Draw,
}

impl GameResult {
  pub fn win_for(player: Player) -> Self {
    match player {
      Player::X => GameResult::XWin,
      Player::O => GameResult::OWin,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
  pub row: usize,
  pub col: usize,
}

impl Coord {
  pub fn new(row: usize, col: usize) -> Self {
    Self { row, col }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
  pub row: usize,
  pub col: usize,
  pub player: Player,
}

/// Raw aggregate of recorded games reaching a configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeCounts {
  pub x_wins: u64,
  pub o_wins: u64,
  pub draws: u64,
}

impl OutcomeCounts {
  pub fn total(&self) -> u64 {
    self.x_wins + self.o_wins + self.draws
  }

  /// Re-reads the counts from `player`'s side of the table.
  pub fn rates_for(&self, player: Player) -> Rates {
    let (win, lose) = match player {
      Player::X => (self.x_wins, self.o_wins),
      Player::O => (self.o_wins, self.x_wins),
    };
    Rates {
      win,
      lose,
      draw: self.draws,
      total: self.total(),
    }
  }
}

/// Evidence attached to a single candidate cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
  pub win: u64,
  pub lose: u64,
  pub draw: u64,
  pub total: u64,
}

impl Rates {
  pub fn has_evidence(&self) -> bool {
    self.total > 0
  }

  pub fn win_rate(&self) -> Option<f64> {
    self.ratio(self.win)
  }

  pub fn lose_rate(&self) -> Option<f64> {
    self.ratio(self.lose)
  }

  fn ratio(&self, count: u64) -> Option<f64> {
    if self.total == 0 {
      None
    } else {
      Some(count as f64 / self.total as f64)
    }
  }
}

impl AddAssign for Rates {
  fn add_assign(&mut self, rhs: Self) {
    self.win += rhs.win;
    self.lose += rhs.lose;
    self.draw += rhs.draw;
    self.total += rhs.total;
  }
}

/// A chosen cell in global board coordinates plus the evidence behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
  pub coord: Coord,
  pub rates: Rates,
  pub win_rate: f64,
  pub lose_rate: f64,
}

impl Selection {
  /// Builds a selection from evidence; `None` when there is none.
  pub fn from_rates(coord: Coord, rates: Rates) -> Option<Self> {
    Some(Self {
      coord,
      rates,
      win_rate: rates.win_rate()?,
      lose_rate: rates.lose_rate()?,
    })
  }

  /// Higher win rate wins; equal win rates fall back to the lower lose rate.
  pub fn beats(&self, other: &Selection) -> bool {
    self.win_rate > other.win_rate
      || (self.win_rate == other.win_rate && self.lose_rate < other.lose_rate)
  }
}
