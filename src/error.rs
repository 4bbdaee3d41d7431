use thiserror::Error;

/// A single statistics-store query that did not produce a count.
///
/// Never reaches callers of the move selector; `TableLookup` logs it and
/// counts the table as zero.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("request timed out after {0} ms")]
  Timeout(u64),
  #[error("store returned {status}: {body}")]
  Status { status: u16, body: String },
  #[error("unparseable count '{0}'")]
  Parse(String),
  #[error("async runtime unavailable: {0}")]
  Runtime(#[from] std::io::Error),
  #[error("{0}")]
  Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("invalid config: {0}")]
  Invalid(String),
  #[error(transparent)]
  Patterns(#[from] PatternError),
}

#[derive(Debug, Error)]
pub enum PatternError {
  #[error("failed to read pattern file {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse pattern file: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("pattern '{name}' must have 5 rows of 5 cells")]
  Shape { name: String },
  #[error("pattern '{name}' has unknown cell '{cell}'")]
  Cell { name: String, cell: char },
  #[error("pattern '{name}' has a non-finite weight")]
  Weight { name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
  #[error("board must be square, row {row} has {len} cells for size {size}")]
  NotSquare { row: usize, len: usize, size: usize },
  #[error("invalid cell value {value} at ({row}, {col})")]
  Cell { row: usize, col: usize, value: u8 },
  #[error("({row}, {col}) is outside the board")]
  OutOfBounds { row: usize, col: usize },
  #[error("({row}, {col}) is already occupied")]
  Occupied { row: usize, col: usize },
  #[error("game is already finished")]
  Finished,
}
