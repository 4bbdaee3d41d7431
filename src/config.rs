use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clickhouse::{ClickHouseSettings, MAX_RETRIES};
use crate::error::ConfigError;
use crate::store::{LevelRange, TableLayout};

/// Highest move count a 5×5 table can hold.
const MAX_LEVEL: u32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
  /// Rank every window with the pattern scorer, then look up the best one.
  PriorityWindow,
  /// Sum evidence over windows centred on own stones near the last move.
  Accumulated,
}

impl Default for Strategy {
  fn default() -> Self {
    Strategy::PriorityWindow
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
  #[serde(default = "default_url")]
  pub url: String,
  #[serde(default = "default_user")]
  pub user: String,
  #[serde(default)]
  pub password: String,
  #[serde(default = "default_database")]
  pub database: String,
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  #[serde(default = "default_retry_backoff_ms")]
  pub retry_backoff_ms: u64,
  #[serde(default = "default_pool_size")]
  pub pool_size: usize,
  #[serde(default = "default_table_prefix")]
  pub table_prefix: String,
  #[serde(default = "default_draw_table")]
  pub draw_table: String,
  #[serde(default = "default_cross_levels")]
  pub cross_levels: LevelRange,
  #[serde(default = "default_nought_levels")]
  pub nought_levels: LevelRange,
}

fn default_url() -> String {
  "http://localhost:8123/".to_string()
}

fn default_user() -> String {
  "default".to_string()
}

fn default_database() -> String {
  "default".to_string()
}

fn default_timeout_ms() -> u64 {
  2000
}

fn default_max_retries() -> u32 {
  MAX_RETRIES
}

fn default_retry_backoff_ms() -> u64 {
  100
}

fn default_pool_size() -> usize {
  16
}

fn default_table_prefix() -> String {
  "ttt_5_l".to_string()
}

fn default_draw_table() -> String {
  "ttt_5_draw".to_string()
}

fn default_cross_levels() -> LevelRange {
  LevelRange::new(9, 25)
}

fn default_nought_levels() -> LevelRange {
  LevelRange::new(10, 24)
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      url: default_url(),
      user: default_user(),
      password: String::new(),
      database: default_database(),
      timeout_ms: default_timeout_ms(),
      max_retries: default_max_retries(),
      retry_backoff_ms: default_retry_backoff_ms(),
      pool_size: default_pool_size(),
      table_prefix: default_table_prefix(),
      draw_table: default_draw_table(),
      cross_levels: default_cross_levels(),
      nought_levels: default_nought_levels(),
    }
  }
}

impl StoreConfig {
  pub fn table_layout(&self) -> TableLayout {
    TableLayout {
      prefix: self.table_prefix.clone(),
      draw_table: self.draw_table.clone(),
      cross_levels: self.cross_levels,
      nought_levels: self.nought_levels,
    }
  }

  pub fn clickhouse_settings(&self) -> ClickHouseSettings {
    ClickHouseSettings {
      url: self.url.clone(),
      user: self.user.clone(),
      password: self.password.clone(),
      database: self.database.clone(),
      timeout: Duration::from_millis(self.timeout_ms),
      max_retries: self.max_retries,
      retry_backoff: Duration::from_millis(self.retry_backoff_ms),
      pool_size: self.pool_size,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
  #[serde(default = "default_board_size")]
  pub board_size: usize,
  #[serde(default)]
  pub strategy: Strategy,
  /// Only windows centred within this distance of the last move are ranked.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scan_radius: Option<usize>,
  #[serde(default = "default_lookup_threads")]
  pub lookup_threads: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub patterns_path: Option<PathBuf>,
  #[serde(default = "default_log_level")]
  pub log_level: String,
  #[serde(default)]
  pub store: StoreConfig,
}

fn default_board_size() -> usize {
  15
}

fn default_lookup_threads() -> usize {
  8
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      board_size: default_board_size(),
      strategy: Strategy::default(),
      scan_radius: None,
      lookup_threads: default_lookup_threads(),
      patterns_path: None,
      log_level: default_log_level(),
      store: StoreConfig::default(),
    }
  }
}

macro_rules! env_override {
  ($env:ident, $target:expr, $key:expr) => {
    if let Some(v) = $env($key) {
      $target = v;
    }
  };
}

impl EngineConfig {
  /// Reads `path` (defaults when `None`), applies `GOMOKU_STATS_*` overrides
  /// and validates the result.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let config = match path {
      Some(path) => Self::from_file(path)?,
      None => Self::default(),
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Ok(serde_json::from_str(&text)?)
  }

  pub fn with_env_overrides<F>(mut self, env: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    env_override!(env, self.store.url, "GOMOKU_STATS_STORE_URL");
    env_override!(env, self.store.user, "GOMOKU_STATS_STORE_USER");
    env_override!(env, self.store.password, "GOMOKU_STATS_STORE_PASSWORD");
    env_override!(env, self.store.database, "GOMOKU_STATS_STORE_DATABASE");
    env_override!(env, self.log_level, "GOMOKU_STATS_LOG_LEVEL");
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::Invalid(msg));
    if self.lookup_threads == 0 {
      return invalid("lookupThreads must be at least 1".to_string());
    }
    if self.store.pool_size == 0 {
      return invalid("store.poolSize must be at least 1".to_string());
    }
    if self.store.max_retries > MAX_RETRIES {
      return invalid(format!("store.maxRetries must be at most {MAX_RETRIES}"));
    }
    if self.store.timeout_ms == 0 {
      return invalid("store.timeoutMs must be positive".to_string());
    }
    check_levels("store.crossLevels", self.store.cross_levels, 1)?;
    check_levels("store.noughtLevels", self.store.nought_levels, 0)?;
    Ok(())
  }
}

fn check_levels(name: &str, range: LevelRange, parity: u32) -> Result<(), ConfigError> {
  if range.first > range.last {
    return Err(ConfigError::Invalid(format!(
      "{name}: first level {} is above last level {}",
      range.first, range.last
    )));
  }
  if range.last > MAX_LEVEL {
    return Err(ConfigError::Invalid(format!(
      "{name}: levels cannot exceed {MAX_LEVEL}"
    )));
  }
  if range.first % 2 != parity || range.last % 2 != parity {
    let kind = if parity == 1 { "odd" } else { "even" };
    return Err(ConfigError::Invalid(format!("{name}: levels must be {kind}")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn empty_object_yields_defaults() {
    let config: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.board_size, 15);
    assert_eq!(config.strategy, Strategy::PriorityWindow);
    assert_eq!(config.store.timeout_ms, 2000);
    assert_eq!(config.store.table_layout(), TableLayout::default());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn camel_case_fields_parse() {
    let config: EngineConfig = serde_json::from_str(
      r#"{
        "boardSize": 10,
        "strategy": "accumulated",
        "scanRadius": 3,
        "store": { "url": "http://db:8123/", "maxRetries": 1, "crossLevels": { "first": 11, "last": 21 } }
      }"#,
    )
    .unwrap();
    assert_eq!(config.board_size, 10);
    assert_eq!(config.strategy, Strategy::Accumulated);
    assert_eq!(config.scan_radius, Some(3));
    assert_eq!(config.store.url, "http://db:8123/");
    assert_eq!(config.store.cross_levels, LevelRange::new(11, 21));
    assert_eq!(config.store.nought_levels, LevelRange::new(10, 24));
    assert_eq!(config.store.clickhouse_settings().max_retries, 1);
  }

  #[test]
  fn environment_overrides_store_credentials() {
    let env: HashMap<&str, &str> = [
      ("GOMOKU_STATS_STORE_URL", "http://stats:8123/"),
      ("GOMOKU_STATS_STORE_PASSWORD", "hunter2"),
      ("GOMOKU_STATS_LOG_LEVEL", "debug"),
    ]
    .into_iter()
    .collect();
    let config = EngineConfig::default().with_env_overrides(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(config.store.url, "http://stats:8123/");
    assert_eq!(config.store.password, "hunter2");
    assert_eq!(config.store.user, "default");
    assert_eq!(config.log_level, "debug");
  }

  #[test]
  fn validation_rejects_bad_values() {
    let mut config = EngineConfig::default();
    config.store.max_retries = 3;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = EngineConfig::default();
    config.lookup_threads = 0;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.store.cross_levels = LevelRange::new(10, 24);
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.store.nought_levels = LevelRange::new(24, 10);
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.store.cross_levels = LevelRange::new(9, 27);
    assert!(config.validate().is_err());
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let err = EngineConfig::from_file(Path::new("/nonexistent/gomoku-stats.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
