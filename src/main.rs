//! gomoku-stats: pick five-in-a-row moves from recorded 5×5 outcomes.
//!
//! ## Usage
//!
//! - `gomoku-stats select --board board.json --player X --last-row 7 --last-col 7`
//! - `gomoku-stats selfplay --max-moves 60`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use gomoku_stats::clickhouse::ClickHouseStore;
use gomoku_stats::fallback::random_nearby;
use gomoku_stats::selfplay::play_game;
use gomoku_stats::{Board, Coord, EngineConfig, MoveSelector, Player, Strategy, TableLookup};

#[derive(Parser)]
#[command(name = "gomoku-stats")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// JSON engine config; defaults apply when omitted
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Pick a move for one board position
  Select {
    /// JSON file holding the board as rows of 0 (empty), 1 (X), 2 (O)
    #[arg(long)]
    board: PathBuf,
    #[arg(long)]
    player: Player,
    #[arg(long)]
    last_row: Option<usize>,
    #[arg(long)]
    last_col: Option<usize>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Answer with a random nearby cell instead of -1/-1 when nothing is found
    #[arg(long)]
    fallback: bool,
  },
  /// Play the selector against itself and print the final board
  Selfplay {
    #[arg(long, default_value_t = 225)]
    max_moves: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
  PriorityWindow,
  Accumulated,
}

impl From<StrategyArg> for Strategy {
  fn from(arg: StrategyArg) -> Self {
    match arg {
      StrategyArg::PriorityWindow => Strategy::PriorityWindow,
      StrategyArg::Accumulated => Strategy::Accumulated,
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoardFile {
  Rows(Vec<Vec<u8>>),
  Wrapped { board: Vec<Vec<u8>> },
}

/// `-1, -1` signals that no move was found.
#[derive(Serialize)]
struct MoveReply {
  row: i64,
  col: i64,
}

impl From<Option<Coord>> for MoveReply {
  fn from(coord: Option<Coord>) -> Self {
    match coord {
      Some(c) => MoveReply {
        row: c.row as i64,
        col: c.col as i64,
      },
      None => MoveReply { row: -1, col: -1 },
    }
  }
}

fn init_tracing(level: &str) -> Result<()> {
  use tracing_subscriber::{fmt, prelude::*, EnvFilter};

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  Ok(())
}

fn build_selector(config: &EngineConfig) -> Result<MoveSelector<TableLookup<ClickHouseStore>>> {
  let store = ClickHouseStore::new(config.store.clickhouse_settings())
    .context("failed to set up statistics store client")?;
  let lookup = TableLookup::new(store, config.store.table_layout());
  Ok(MoveSelector::from_config(config, lookup)?)
}

fn read_board(path: &Path) -> Result<Board> {
  let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let rows = match serde_json::from_str::<BoardFile>(&text).context("board file is not a row array")? {
    BoardFile::Rows(rows) | BoardFile::Wrapped { board: rows } => rows,
  };
  Ok(Board::from_rows(&rows)?)
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  let mut config = EngineConfig::load(cli.config.as_deref())?;
  init_tracing(&config.log_level)?;

  match cli.command {
    Commands::Select {
      board,
      player,
      last_row,
      last_col,
      strategy,
      fallback,
    } => {
      if let Some(strategy) = strategy {
        config.strategy = strategy.into();
      }
      let board = read_board(&board)?;
      let last_move = match (last_row, last_col) {
        (Some(row), Some(col)) if board.in_bounds(row, col) => Some(Coord { row, col }),
        _ => None,
      };
      info!(size = board.size(), player = %player, ?last_move, "selecting move");

      let selector = build_selector(&config)?;
      let mut coord = selector.select(&board, player, last_move).map(|s| s.coord);
      if coord.is_none() && fallback {
        let anchor = last_move.unwrap_or(Coord::new(board.size() / 2, board.size() / 2));
        coord = random_nearby(&board, anchor, &mut rand::thread_rng());
      }
      println!("{}", serde_json::to_string(&MoveReply::from(coord))?);
    }
    Commands::Selfplay { max_moves, seed } => {
      let selector = build_selector(&config)?;
      let mut rng = StdRng::seed_from_u64(seed);
      let (game, report) = play_game(&selector, config.board_size, max_moves, &mut rng)?;
      println!("{}", game.board);
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
  }

  Ok(())
}
