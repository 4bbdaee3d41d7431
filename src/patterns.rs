//! Pattern-priority heuristic for ranking windows.
//!
//! Two libraries are authored, one per mark. Each template is written from
//! its owner's side:
//! - `S`: must be the owner's stone
//! - `O`: must be the other mark's stone
//! - `+`: must not be the opponent of the scoring perspective
//! - `.`: anything
//!
//! Scoring from a perspective uses that mark's library as "self" and the
//! other library, with `S` and `O` swapped, as "opponent". A pattern adds its
//! weight once per window if any of its eight symmetric images match.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::error::PatternError;
use crate::symmetry::Symmetry;
use crate::types::{Player, WINDOW_CELLS, WINDOW_SIZE};
use crate::window::Window;

const DEFAULT_PATTERNS_JSON: &str = include_str!("../patterns/default.json");

lazy_static! {
  pub static ref DEFAULT_LIBRARY: PatternLibrary =
    PatternLibrary::from_json(DEFAULT_PATTERNS_JSON).expect("embedded pattern library is valid");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternCell {
  Wildcard,
  MustBeSelf,
  MustBeOpponent,
  MustNotBeOpponent,
}

impl PatternCell {
  fn parse(ch: char) -> Option<Self> {
    match ch {
      '.' | '?' => Some(PatternCell::Wildcard),
      'S' => Some(PatternCell::MustBeSelf),
      'O' => Some(PatternCell::MustBeOpponent),
      '+' => Some(PatternCell::MustNotBeOpponent),
      _ => None,
    }
  }

  fn flipped(self) -> Self {
    match self {
      PatternCell::MustBeSelf => PatternCell::MustBeOpponent,
      PatternCell::MustBeOpponent => PatternCell::MustBeSelf,
      other => other,
    }
  }

  fn accepts(self, cell: Option<Player>, me: Player) -> bool {
    match self {
      PatternCell::Wildcard => true,
      PatternCell::MustBeSelf => cell == Some(me),
      PatternCell::MustBeOpponent => cell == Some(me.other()),
      PatternCell::MustNotBeOpponent => cell != Some(me.other()),
    }
  }
}

pub type Template = [PatternCell; WINDOW_CELLS];

#[derive(Clone, Debug)]
pub struct Pattern {
  pub name: String,
  pub weight: f64,
  template: Template,
  /// Distinct symmetric images of `template`.
  images: Vec<Template>,
}

impl Pattern {
  pub fn new(name: impl Into<String>, weight: f64, template: Template) -> Self {
    let mut images: Vec<Template> = Vec::with_capacity(Symmetry::ALL.len());
    for sym in Symmetry::ALL {
      let image = sym.apply(&template);
      if !images.contains(&image) {
        images.push(image);
      }
    }
    Self {
      name: name.into(),
      weight,
      template,
      images,
    }
  }

  /// Parses five rows of five template characters.
  pub fn parse(name: &str, weight: f64, rows: &[impl AsRef<str>]) -> Result<Self, PatternError> {
    if !weight.is_finite() {
      return Err(PatternError::Weight {
        name: name.to_string(),
      });
    }
    let shape_err = || PatternError::Shape {
      name: name.to_string(),
    };
    if rows.len() != WINDOW_SIZE {
      return Err(shape_err());
    }
    let mut template = [PatternCell::Wildcard; WINDOW_CELLS];
    for (row, line) in rows.iter().enumerate() {
      let chars: Vec<char> = line.as_ref().chars().collect();
      if chars.len() != WINDOW_SIZE {
        return Err(shape_err());
      }
      for (col, ch) in chars.into_iter().enumerate() {
        template[row * WINDOW_SIZE + col] = PatternCell::parse(ch).ok_or(PatternError::Cell {
          name: name.to_string(),
          cell: ch,
        })?;
      }
    }
    Ok(Pattern::new(name, weight, template))
  }

  fn flipped(&self) -> Pattern {
    let mut template = self.template;
    for cell in template.iter_mut() {
      *cell = cell.flipped();
    }
    Pattern::new(self.name.clone(), self.weight, template)
  }

  /// True if any symmetric image of the pattern fits the window.
  pub fn matches(&self, window: &Window, me: Player) -> bool {
    self
      .images
      .iter()
      .any(|image| template_matches(image, window, me))
  }
}

fn template_matches(template: &Template, window: &Window, me: Player) -> bool {
  template
    .iter()
    .zip(window.cells().iter())
    .all(|(rule, &cell)| rule.accepts(cell, me))
}

#[derive(Deserialize)]
struct PatternFile {
  cross: Vec<PatternEntry>,
  nought: Vec<PatternEntry>,
}

#[derive(Deserialize)]
struct PatternEntry {
  name: String,
  weight: f64,
  rows: Vec<String>,
}

/// Static pattern tables; built once and never mutated.
#[derive(Clone, Debug)]
pub struct PatternLibrary {
  cross: Vec<Pattern>,
  nought: Vec<Pattern>,
  // The other mark's library, as seen from each perspective.
  cross_against: Vec<Pattern>,
  nought_against: Vec<Pattern>,
}

impl PatternLibrary {
  /// `cross` is X's library and `nought` is O's, both written with `S` as the owner.
  pub fn new(cross: Vec<Pattern>, nought: Vec<Pattern>) -> Self {
    let cross_against = cross.iter().map(Pattern::flipped).collect();
    let nought_against = nought.iter().map(Pattern::flipped).collect();
    Self {
      cross,
      nought,
      cross_against,
      nought_against,
    }
  }

  pub fn from_json(text: &str) -> Result<Self, PatternError> {
    let file: PatternFile = serde_json::from_str(text)?;
    let parse_all = |entries: &[PatternEntry]| -> Result<Vec<Pattern>, PatternError> {
      entries
        .iter()
        .map(|entry| Pattern::parse(&entry.name, entry.weight, entry.rows.as_slice()))
        .collect()
    };
    Ok(Self::new(parse_all(&file.cross)?, parse_all(&file.nought)?))
  }

  pub fn load(path: &Path) -> Result<Self, PatternError> {
    let text = fs::read_to_string(path).map_err(|source| PatternError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&text)
  }

  pub fn library_for(&self, owner: Player) -> &[Pattern] {
    match owner {
      Player::X => &self.cross,
      Player::O => &self.nought,
    }
  }

  pub fn len(&self) -> usize {
    self.cross.len() + self.nought.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Sum of the weights of every pattern, from either library, that fits
  /// the window from `perspective`'s side.
  pub fn score(&self, window: &Window, perspective: Player) -> f64 {
    let (own, against) = match perspective {
      Player::X => (&self.cross, &self.nought_against),
      Player::O => (&self.nought, &self.cross_against),
    };
    own
      .iter()
      .chain(against.iter())
      .filter(|pattern| pattern.matches(window, perspective))
      .map(|pattern| pattern.weight)
      .sum()
  }
}

/// Scores a window against the built-in library.
pub fn score(window: &Window, perspective: Player) -> f64 {
  DEFAULT_LIBRARY.score(window, perspective)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::Board;
  use crate::types::Coord;
  use crate::window::window_at;

  fn window_from_rows(rows: [&str; WINDOW_SIZE]) -> Window {
    let mut board = Board::new(WINDOW_SIZE);
    for (row, line) in rows.iter().enumerate() {
      for (col, ch) in line.chars().enumerate() {
        match ch {
          'X' => board.set(Coord { row, col }, Player::X),
          'O' => board.set(Coord { row, col }, Player::O),
          _ => {}
        }
      }
    }
    window_at(&board, Coord::new(0, 0)).unwrap()
  }

  fn single(cross: &[(&str, f64, [&str; 5])], nought: &[(&str, f64, [&str; 5])]) -> PatternLibrary {
    let build = |entries: &[(&str, f64, [&str; 5])]| {
      entries
        .iter()
        .map(|(name, weight, rows)| Pattern::parse(name, *weight, rows).unwrap())
        .collect()
    };
    PatternLibrary::new(build(cross), build(nought))
  }

  #[test]
  fn default_library_loads() {
    assert_eq!(DEFAULT_LIBRARY.library_for(Player::X).len(), 104);
    assert_eq!(DEFAULT_LIBRARY.library_for(Player::O).len(), 104);
    assert!(!DEFAULT_LIBRARY.is_empty());
  }

  #[test]
  fn split_four_matches_on_any_row_or_orientation() {
    let four = DEFAULT_LIBRARY
      .library_for(Player::X)
      .iter()
      .find(|p| p.name == "four-h1-3")
      .unwrap();
    let top = window_from_rows(["XX.XX", ".....", ".....", ".....", "....."]);
    assert!(four.matches(&top, Player::X));
    // The same shape down the right-hand column is a rotated image.
    let side = window_from_rows(["....X", "....X", ".....", "....X", "....X"]);
    assert!(four.matches(&side, Player::X));
  }

  #[test]
  fn opponent_stone_blocks_not_opponent_cell() {
    let four = DEFAULT_LIBRARY
      .library_for(Player::X)
      .iter()
      .find(|p| p.name == "four-h1-3")
      .unwrap();
    let blocked = window_from_rows(["XXOXX", ".....", ".....", ".....", "....."]);
    assert!(!four.matches(&blocked, Player::X));
  }

  #[test]
  fn weight_counts_once_even_when_every_image_matches() {
    let lib = single(&[("corner", 3.0, ["+....", ".....", ".....", ".....", "....."])], &[]);
    let empty = window_from_rows([".....", ".....", ".....", ".....", "....."]);
    assert_eq!(lib.score(&empty, Player::X), 3.0);
  }

  #[test]
  fn opponent_library_is_read_with_marks_swapped() {
    let lib = single(&[], &[("split-four", 10.0, ["SS+SS", ".....", ".....", ".....", "....."])]);
    let open = window_from_rows(["OO.OO", ".....", ".....", ".....", "....."]);
    assert_eq!(lib.score(&open, Player::O), 10.0);
    assert_eq!(lib.score(&open, Player::X), 10.0);

    // A cross in the gap is the scoring side's opponent only for O.
    let filled = window_from_rows(["OOXOO", ".....", ".....", ".....", "....."]);
    assert_eq!(lib.score(&filled, Player::O), 0.0);
    assert_eq!(lib.score(&filled, Player::X), 10.0);
  }

  #[test]
  fn score_is_invariant_under_window_symmetry() {
    let windows = [
      window_from_rows(["X.O..", ".XX..", "..XO.", "O..X.", "....O"]),
      window_from_rows(["OO.O.", "..X..", ".X...", "X...X", "....."]),
      window_from_rows([".....", ".XXX.", "..O..", ".....", "O...."]),
    ];
    for window in windows.iter() {
      for sym in Symmetry::ALL {
        let image = window.transformed(sym);
        for perspective in [Player::X, Player::O] {
          assert_eq!(
            score(window, perspective),
            score(&image, perspective),
            "{:?} {:?}",
            sym,
            perspective
          );
        }
      }
    }
  }

  #[test]
  fn quarter_turn_scores_equal_for_asymmetric_library() {
    let lib = single(
      &[("hook", 7.0, ["SS...", "S....", ".....", ".....", "...O."])],
      &[("bar", 2.5, [".....", ".SSS.", ".....", ".....", "....."])],
    );
    let window = window_from_rows(["XX...", "X....", ".....", ".OOO.", "...O."]);
    let turned = window.transformed(Symmetry::Rotate90);
    for perspective in [Player::X, Player::O] {
      assert_eq!(lib.score(&window, perspective), lib.score(&turned, perspective));
    }
    assert_eq!(lib.score(&window, Player::X), 9.5);
  }

  #[test]
  fn malformed_patterns_are_rejected() {
    assert!(matches!(
      Pattern::parse("short", 1.0, &["SSSS", ".....", ".....", ".....", "....."]),
      Err(PatternError::Shape { .. })
    ));
    assert!(matches!(
      Pattern::parse("bad", 1.0, &["SSZSS", ".....", ".....", ".....", "....."]),
      Err(PatternError::Cell { cell: 'Z', .. })
    ));
    assert!(matches!(
      PatternLibrary::from_json("{\"cross\": []}"),
      Err(PatternError::Parse(_))
    ));
  }
}
