//! Move selection over the large board.
//!
//! Window scoring and per-cell lookups run on rayon; results are collected
//! in enumeration order, so every tie-break is the same as a sequential scan.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::canonical::{canonicalize, Configuration};
use crate::config::{EngineConfig, Strategy};
use crate::engine::Board;
use crate::error::ConfigError;
use crate::patterns::{PatternLibrary, DEFAULT_LIBRARY};
use crate::store::OutcomeLookup;
use crate::types::{Coord, Player, Rates, Selection, WINDOW_CELLS, WINDOW_SIZE};
use crate::window::{anchors, center_distance, extract_window, window_at, Window};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
  /// Limit ranked windows to those centred within this distance of the
  /// last move. Ignored when no window qualifies.
  pub scan_radius: Option<usize>,
}

/// Rates for every local cell of `window` if `player` moved there, in
/// row-major order. Occupied cells and cells without evidence stay zero.
pub fn cell_rates<L>(window: &Window, player: Player, lookup: &L) -> [Rates; WINDOW_CELLS]
where
  L: OutcomeLookup + ?Sized,
{
  let base = window.configuration();
  let keyed: Vec<((usize, usize), Configuration)> = window
    .empty_cells()
    .into_iter()
    .map(|(row, col)| ((row, col), canonicalize(&base.with_stone(row, col, player))))
    .collect();

  // Symmetric placements share a key; ask the store once per key.
  let unique: Vec<Configuration> = keyed
    .iter()
    .map(|(_, key)| *key)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();
  let answers: HashMap<Configuration, Rates> = unique
    .par_iter()
    .map(|key| (*key, lookup.rates_for(key, player)))
    .collect();

  let mut grid = [Rates::default(); WINDOW_CELLS];
  for ((row, col), key) in keyed {
    let rates = answers.get(&key).copied().unwrap_or_default();
    debug!(
      row = window.origin().row + row,
      col = window.origin().col + col,
      win = rates.win,
      lose = rates.lose,
      draw = rates.draw,
      total = rates.total,
      "cell evidence"
    );
    grid[row * WINDOW_SIZE + col] = rates;
  }
  grid
}

/// First candidate that no later candidate beats. Candidates without
/// evidence are skipped.
pub fn pick_best<I>(candidates: I) -> Option<Selection>
where
  I: IntoIterator<Item = (Coord, Rates)>,
{
  let mut best: Option<Selection> = None;
  for (coord, rates) in candidates {
    let Some(candidate) = Selection::from_rates(coord, rates) else {
      continue;
    };
    if best.as_ref().map_or(true, |current| candidate.beats(current)) {
      best = Some(candidate);
    }
  }
  best
}

/// The window the pattern scorer ranks highest for `player`, first found on
/// ties. Windows with no empty cell are never chosen.
pub fn best_window(
  board: &Board,
  player: Player,
  last_move: Option<Coord>,
  patterns: &PatternLibrary,
  options: &SearchOptions,
) -> Option<(Window, f64)> {
  let all = anchors(board.size());
  let near: Vec<Coord> = match (options.scan_radius, last_move) {
    (Some(radius), Some(last)) => all
      .iter()
      .copied()
      .filter(|&origin| center_distance(origin, last) <= radius)
      .collect(),
    _ => Vec::new(),
  };
  let candidates = if near.is_empty() { all } else { near };

  let scored: Vec<Option<(Window, f64)>> = candidates
    .par_iter()
    .map(|&origin| {
      let window = window_at(board, origin)?;
      if window.stone_count() == WINDOW_CELLS {
        return None;
      }
      Some((window, patterns.score(&window, player)))
    })
    .collect();

  let mut best: Option<(Window, f64)> = None;
  for (window, score) in scored.into_iter().flatten() {
    if best.as_ref().map_or(true, |(_, top)| score > *top) {
      best = Some((window, score));
    }
  }
  best
}

/// Ranks windows by pattern priority, then picks the best-evidenced empty
/// cell of the top window. `None` means the caller must fall back.
pub fn select_move<L>(
  board: &Board,
  player: Player,
  last_move: Option<Coord>,
  patterns: &PatternLibrary,
  lookup: &L,
  options: &SearchOptions,
) -> Option<Selection>
where
  L: OutcomeLookup + ?Sized,
{
  if board.is_full() {
    return None;
  }
  let (window, score) = best_window(board, player, last_move, patterns, options)?;
  debug!(
    origin_row = window.origin().row,
    origin_col = window.origin().col,
    score,
    "selected window"
  );

  let grid = cell_rates(&window, player, lookup);
  let candidates = window.empty_cells().into_iter().map(|(row, col)| {
    (window.to_global(row, col), grid[row * WINDOW_SIZE + col])
  });
  let selection = pick_best(candidates);
  log_selection(player, selection.as_ref());
  selection
}

/// Evidence summed per global cell over windows centred on `player`'s stones
/// in the neighbourhood of `last_move`. Keys iterate in row-major order.
pub fn accumulated_rates<L>(
  board: &Board,
  player: Player,
  last_move: Coord,
  lookup: &L,
) -> BTreeMap<Coord, Rates>
where
  L: OutcomeLookup + ?Sized,
{
  let mut totals: BTreeMap<Coord, Rates> = BTreeMap::new();
  let Some(region) = extract_window(board, last_move) else {
    return totals;
  };

  for idx in 0..WINDOW_CELLS {
    let (row, col) = (idx / WINDOW_SIZE, idx % WINDOW_SIZE);
    if region.get(row, col) != Some(player) {
      continue;
    }
    let Some(window) = extract_window(board, region.to_global(row, col)) else {
      continue;
    };
    let grid = cell_rates(&window, player, lookup);
    for (local_row, local_col) in window.empty_cells() {
      *totals.entry(window.to_global(local_row, local_col)).or_default() +=
        grid[local_row * WINDOW_SIZE + local_col];
    }
  }
  totals
}

/// Neighbourhood strategy: the best accumulated cell around the last move.
pub fn select_move_accumulated<L>(
  board: &Board,
  player: Player,
  last_move: Coord,
  lookup: &L,
) -> Option<Selection>
where
  L: OutcomeLookup + ?Sized,
{
  if board.is_full() {
    return None;
  }
  let selection = pick_best(accumulated_rates(board, player, last_move, lookup));
  log_selection(player, selection.as_ref());
  selection
}

fn log_selection(player: Player, selection: Option<&Selection>) {
  match selection {
    Some(sel) => info!(
      player = %player,
      row = sel.coord.row,
      col = sel.coord.col,
      win_rate = sel.win_rate,
      lose_rate = sel.lose_rate,
      games = sel.rates.total,
      "move selected"
    ),
    None => info!(player = %player, "no cell has recorded outcomes"),
  }
}

/// Configured selector: strategy, pattern library, lookup and a dedicated
/// worker pool for window scoring and lookups.
pub struct MoveSelector<L> {
  lookup: L,
  patterns: PatternLibrary,
  strategy: Strategy,
  options: SearchOptions,
  pool: rayon::ThreadPool,
}

impl<L: OutcomeLookup> MoveSelector<L> {
  pub fn new(
    lookup: L,
    patterns: PatternLibrary,
    strategy: Strategy,
    options: SearchOptions,
    threads: usize,
  ) -> Result<Self, ConfigError> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(threads)
      .thread_name(|i| format!("lookup-{i}"))
      .build()
      .map_err(|e| ConfigError::Invalid(format!("failed to start lookup workers: {e}")))?;
    Ok(Self {
      lookup,
      patterns,
      strategy,
      options,
      pool,
    })
  }

  pub fn from_config(config: &EngineConfig, lookup: L) -> Result<Self, ConfigError> {
    let patterns = match &config.patterns_path {
      Some(path) => PatternLibrary::load(path)?,
      None => DEFAULT_LIBRARY.clone(),
    };
    let options = SearchOptions {
      scan_radius: config.scan_radius,
    };
    Self::new(lookup, patterns, config.strategy, options, config.lookup_threads)
  }

  pub fn strategy(&self) -> Strategy {
    self.strategy
  }

  /// Picks a move for `player`. Without a last move the neighbourhood
  /// strategy has nothing to centre on and ranks windows instead.
  pub fn select(&self, board: &Board, player: Player, last_move: Option<Coord>) -> Option<Selection> {
    self.pool.install(|| match (self.strategy, last_move) {
      (Strategy::Accumulated, Some(last)) => {
        select_move_accumulated(board, player, last, &self.lookup)
      }
      _ => select_move(
        board,
        player,
        last_move,
        &self.patterns,
        &self.lookup,
        &self.options,
      ),
    })
  }
}
