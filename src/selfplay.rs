use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::GameState;
use crate::error::BoardError;
use crate::fallback::random_nearby;
use crate::search::MoveSelector;
use crate::store::OutcomeLookup;
use crate::types::{Coord, GameResult};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfPlayReport {
  pub moves: usize,
  /// `None` when the move limit ended the game.
  pub result: Option<GameResult>,
  /// Moves chosen from recorded outcomes.
  pub selected: usize,
  /// Moves taken from the random fallback.
  pub fallbacks: usize,
}

/// Plays the selector against itself until someone wins, the board fills
/// or `max_moves` stones are down.
pub fn play_game<L, R>(
  selector: &MoveSelector<L>,
  board_size: usize,
  max_moves: usize,
  rng: &mut R,
) -> Result<(GameState, SelfPlayReport), BoardError>
where
  L: OutcomeLookup,
  R: Rng,
{
  let mut game = GameState::new(board_size);
  let center = Coord::new(board_size / 2, board_size / 2);
  let mut selected = 0;
  let mut fallbacks = 0;

  while game.result.is_none() && game.moves.len() < max_moves {
    let last_move = game.last_move();
    let coord = match selector.select(&game.board, game.to_move, last_move) {
      Some(selection) => {
        selected += 1;
        selection.coord
      }
      None => {
        let Some(coord) = random_nearby(&game.board, last_move.unwrap_or(center), rng) else {
          break;
        };
        fallbacks += 1;
        debug!(row = coord.row, col = coord.col, "fallback move");
        coord
      }
    };
    game.apply_move(coord.row, coord.col)?;
  }

  let report = SelfPlayReport {
    moves: game.moves.len(),
    result: game.result,
    selected,
    fallbacks,
  };
  info!(
    moves = report.moves,
    result = ?report.result,
    selected,
    fallbacks,
    "self-play finished"
  );
  Ok((game, report))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::canonical::Configuration;
  use crate::config::Strategy;
  use crate::patterns::PatternLibrary;
  use crate::search::SearchOptions;
  use crate::types::OutcomeCounts;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  struct NoGames;

  impl OutcomeLookup for NoGames {
    fn lookup_counts(&self, _config: &Configuration) -> OutcomeCounts {
      OutcomeCounts::default()
    }
  }

  struct XAlwaysWins;

  impl OutcomeLookup for XAlwaysWins {
    fn lookup_counts(&self, _config: &Configuration) -> OutcomeCounts {
      OutcomeCounts {
        x_wins: 4,
        o_wins: 1,
        draws: 0,
      }
    }
  }

  fn selector<L: OutcomeLookup>(lookup: L) -> MoveSelector<L> {
    MoveSelector::new(
      lookup,
      PatternLibrary::new(Vec::new(), Vec::new()),
      Strategy::PriorityWindow,
      SearchOptions::default(),
      2,
    )
    .unwrap()
  }

  #[test]
  fn empty_store_plays_fallback_moves_only() {
    let mut rng = StdRng::seed_from_u64(11);
    let (game, report) = play_game(&selector(NoGames), 7, 10, &mut rng).unwrap();
    assert_eq!(report.selected, 0);
    assert_eq!(report.fallbacks, game.moves.len());
    assert!(report.moves <= 10);
  }

  #[test]
  fn game_ends_on_a_result_or_the_move_limit() {
    let mut rng = StdRng::seed_from_u64(5);
    let (game, report) = play_game(&selector(XAlwaysWins), 7, 49, &mut rng).unwrap();
    assert!(report.selected > 0);
    assert_eq!(report.result, game.result);
    assert!(report.result.is_some() || report.moves == 49);
  }
}
