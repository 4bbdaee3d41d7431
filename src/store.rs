//! Outcome lookup over the level-partitioned statistics tables.
//!
//! Two seams: [`CountSource`] answers one table at a time and may fail;
//! [`OutcomeLookup`] answers the aggregated triple and never fails.
//! [`TableLookup`] bridges them, turning every failed table into a zero.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::canonical::Configuration;
use crate::error::StoreError;
use crate::types::{OutcomeCounts, Player, Rates};

/// Outcome a recorded game is tagged with (`win_actor` in the store).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeMark {
  Win(Player),
  Draw,
}

impl OutcomeMark {
  pub fn as_char(self) -> char {
    match self {
      OutcomeMark::Win(player) => player.mark(),
      OutcomeMark::Draw => 'D',
    }
  }
}

impl fmt::Display for OutcomeMark {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_char())
  }
}

/// Number of recorded games in `table` tagged `mark` whose position contains
/// every stone of `config`.
pub trait CountSource: Send + Sync {
  fn count(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> Result<u64, StoreError>;
}

impl<T: CountSource + ?Sized> CountSource for Arc<T> {
  fn count(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> Result<u64, StoreError> {
    (**self).count(table, config, mark)
  }
}

impl<T: CountSource + ?Sized> CountSource for Box<T> {
  fn count(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> Result<u64, StoreError> {
    (**self).count(table, config, mark)
  }
}

/// Aggregated outcome evidence for a configuration.
pub trait OutcomeLookup: Send + Sync {
  fn lookup_counts(&self, config: &Configuration) -> OutcomeCounts;

  fn rates_for(&self, config: &Configuration, player: Player) -> Rates {
    self.lookup_counts(config).rates_for(player)
  }
}

impl<T: OutcomeLookup + ?Sized> OutcomeLookup for Arc<T> {
  fn lookup_counts(&self, config: &Configuration) -> OutcomeCounts {
    (**self).lookup_counts(config)
  }
}

impl<T: OutcomeLookup + ?Sized> OutcomeLookup for Box<T> {
  fn lookup_counts(&self, config: &Configuration) -> OutcomeCounts {
    (**self).lookup_counts(config)
  }
}

/// Inclusive move-count range stepping by two, so a range stays on one parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
  pub first: u32,
  pub last: u32,
}

impl LevelRange {
  pub fn new(first: u32, last: u32) -> Self {
    Self { first, last }
  }

  pub fn levels(&self) -> impl Iterator<Item = u32> {
    (self.first..=self.last).step_by(2)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableLayout {
  pub prefix: String,
  pub draw_table: String,
  /// Levels whose table records X wins (odd move counts).
  pub cross_levels: LevelRange,
  /// Levels whose table records O wins (even move counts).
  pub nought_levels: LevelRange,
}

impl Default for TableLayout {
  fn default() -> Self {
    Self {
      prefix: "ttt_5_l".to_string(),
      draw_table: "ttt_5_draw".to_string(),
      cross_levels: LevelRange::new(9, 25),
      nought_levels: LevelRange::new(10, 24),
    }
  }
}

impl TableLayout {
  pub fn table(&self, level: u32) -> String {
    format!("{}{}", self.prefix, level)
  }

  /// Win tables for `winner` that a position with `occupied` stones can
  /// appear in.
  pub fn win_tables(&self, winner: Player, occupied: usize) -> Vec<String> {
    let range = match winner {
      Player::X => self.cross_levels,
      Player::O => self.nought_levels,
    };
    range
      .levels()
      .filter(|&level| level as usize >= occupied)
      .map(|level| self.table(level))
      .collect()
  }
}

pub struct TableLookup<S> {
  source: S,
  layout: TableLayout,
}

impl<S: CountSource> TableLookup<S> {
  pub fn new(source: S, layout: TableLayout) -> Self {
    Self { source, layout }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  fn count_or_zero(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> u64 {
    match self.source.count(table, config, mark) {
      Ok(count) => count,
      Err(err) => {
        warn!(table, %mark, config = %config, error = %err, "outcome query failed, counting as zero");
        0
      }
    }
  }

  fn sum_wins(&self, winner: Player, config: &Configuration) -> u64 {
    self
      .layout
      .win_tables(winner, config.occupied())
      .iter()
      .map(|table| self.count_or_zero(table, config, OutcomeMark::Win(winner)))
      .sum()
  }
}

impl<S: CountSource> OutcomeLookup for TableLookup<S> {
  fn lookup_counts(&self, config: &Configuration) -> OutcomeCounts {
    let occupied = config.occupied();
    if occupied == 0 {
      return OutcomeCounts::default();
    }
    let counts = OutcomeCounts {
      x_wins: self.sum_wins(Player::X, config),
      o_wins: self.sum_wins(Player::O, config),
      draws: self.count_or_zero(&self.layout.draw_table, config, OutcomeMark::Draw),
    };
    trace!(config = %config, ?counts, "outcome lookup");
    counts
  }
}

/// In-process table set with the same containment and mark filtering as the
/// SQL store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
  tables: HashMap<String, Vec<(OutcomeMark, Configuration)>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, table: &str, mark: OutcomeMark, record: Configuration) {
    self.insert_many(table, mark, record, 1);
  }

  /// Records `count` copies of the same final position.
  pub fn insert_many(&mut self, table: &str, mark: OutcomeMark, record: Configuration, count: usize) {
    let rows = self.tables.entry(table.to_string()).or_default();
    rows.extend(std::iter::repeat((mark, record)).take(count));
  }

  pub fn len(&self) -> usize {
    self.tables.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl CountSource for MemoryStore {
  fn count(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> Result<u64, StoreError> {
    let rows = match self.tables.get(table) {
      Some(rows) => rows,
      None => return Ok(0),
    };
    Ok(
      rows
        .iter()
        .filter(|(tag, record)| *tag == mark && record.contains(config))
        .count() as u64,
    )
  }
}
