//! Statistics-driven move selection for five-in-a-row on large boards.
//!
//! A fixed 5×5 outcome corpus is applied to an arbitrary board by ranking
//! 5×5 windows with a pattern heuristic and then looking up recorded
//! outcomes for every empty cell of the chosen window.

pub mod canonical;
pub mod clickhouse;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod patterns;
pub mod rules;
pub mod search;
pub mod selfplay;
pub mod store;
pub mod symmetry;
pub mod types;
pub mod window;

pub use canonical::{canonicalize, CellOrder, Configuration};
pub use config::{EngineConfig, Strategy};
pub use engine::{Board, GameState};
pub use search::{select_move, select_move_accumulated, MoveSelector, SearchOptions};
pub use store::{CountSource, MemoryStore, OutcomeLookup, OutcomeMark, TableLayout, TableLookup};
pub use types::{Coord, OutcomeCounts, Player, Rates, Selection};
