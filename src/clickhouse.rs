//! HTTP count source for a ClickHouse-compatible statistics store.
//!
//! Every count is one `SELECT COUNT(win_actor)` posted as the request body.
//! The client keeps a bounded pool of idle connections and runs on a private
//! tokio runtime, so synchronous callers (including rayon workers) can block
//! on it.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tracing::debug;

use crate::canonical::Configuration;
use crate::error::StoreError;
use crate::store::{CountSource, OutcomeMark};

/// Upper bound on retries of a single table query.
pub const MAX_RETRIES: u32 = 2;
const IO_THREADS: usize = 2;

#[derive(Clone, Debug)]
pub struct ClickHouseSettings {
  pub url: String,
  pub user: String,
  pub password: String,
  pub database: String,
  pub timeout: Duration,
  pub max_retries: u32,
  pub retry_backoff: Duration,
  pub pool_size: usize,
}

pub struct ClickHouseStore {
  client: Client,
  runtime: Runtime,
  settings: ClickHouseSettings,
}

impl ClickHouseStore {
  pub fn new(settings: ClickHouseSettings) -> Result<Self, StoreError> {
    let client = Client::builder()
      .pool_max_idle_per_host(settings.pool_size)
      .connect_timeout(settings.timeout)
      .timeout(settings.timeout)
      .build()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(IO_THREADS)
      .thread_name("clickhouse-io")
      .enable_all()
      .build()?;
    Ok(Self {
      client,
      runtime,
      settings,
    })
  }

  pub async fn count_async(
    &self,
    table: &str,
    config: &Configuration,
    mark: OutcomeMark,
  ) -> Result<u64, StoreError> {
    let sql = build_count_sql(table, config, mark);
    let attempts = self.settings.max_retries.min(MAX_RETRIES) + 1;
    let mut last_error = StoreError::Unavailable("no attempt made".to_string());

    for attempt in 1..=attempts {
      match self.query_once(&sql).await {
        Ok(count) => return Ok(count),
        Err(err) if !is_transient(&err) => return Err(err),
        Err(err) => {
          debug!(table, attempt, error = %err, "store query attempt failed");
          last_error = err;
          if attempt < attempts {
            tokio::time::sleep(self.settings.retry_backoff).await;
          }
        }
      }
    }

    Err(last_error)
  }

  /// One attempt; the deadline covers the headers and the whole body.
  async fn query_once(&self, sql: &str) -> Result<u64, StoreError> {
    let exchange = async {
      let response = self
        .client
        .post(&self.settings.url)
        .query(&[
          ("user", self.settings.user.as_str()),
          ("password", self.settings.password.as_str()),
          ("database", self.settings.database.as_str()),
        ])
        .body(sql.to_string())
        .send()
        .await?;
      let status = response.status();
      let body = response.text().await?;
      Ok::<_, StoreError>((status, body))
    };

    let (status, body) = timeout(self.settings.timeout, exchange)
      .await
      .map_err(|_| StoreError::Timeout(self.settings.timeout.as_millis() as u64))??;

    if !status.is_success() {
      return Err(StoreError::Status {
        status: status.as_u16(),
        body: truncate_for_error(&body),
      });
    }
    parse_count(&body)
  }
}

impl CountSource for ClickHouseStore {
  fn count(&self, table: &str, config: &Configuration, mark: OutcomeMark) -> Result<u64, StoreError> {
    self.runtime.block_on(self.count_async(table, config, mark))
  }
}

fn is_transient(err: &StoreError) -> bool {
  match err {
    StoreError::Http(_) | StoreError::Timeout(_) => true,
    StoreError::Status { status, .. } => *status >= 500,
    _ => false,
  }
}

/// `SELECT COUNT(win_actor) FROM <table> WHERE i11 = 'X' AND ... AND
/// win_actor = '<outcome>'`, one term per occupied cell.
pub fn build_count_sql(table: &str, config: &Configuration, outcome: OutcomeMark) -> String {
  let mut terms: Vec<String> = config
    .constraints()
    .into_iter()
    .map(|(column, mark)| format!("{column} = '{mark}'"))
    .collect();
  terms.push(format!("win_actor = '{outcome}'"));
  format!("SELECT COUNT(win_actor) FROM {table} WHERE {}", terms.join(" AND "))
}

/// The store answers with a bare integer; an empty body means no rows.
pub fn parse_count(body: &str) -> Result<u64, StoreError> {
  let trimmed = body.trim();
  if trimmed.is_empty() {
    return Ok(0);
  }
  trimmed
    .parse::<u64>()
    .map_err(|_| StoreError::Parse(truncate_for_error(trimmed)))
}

fn truncate_for_error(body: &str) -> String {
  const LIMIT: usize = 200;
  if body.chars().count() <= LIMIT {
    body.to_string()
  } else {
    let head: String = body.chars().take(LIMIT).collect();
    format!("{head}...")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Player;
  use std::io::{Read, Write};
  use std::net::TcpListener;
  use std::thread;
  use std::time::Instant;

  fn settings(url: &str) -> ClickHouseSettings {
    ClickHouseSettings {
      url: url.to_string(),
      user: "default".to_string(),
      password: String::new(),
      database: "default".to_string(),
      timeout: Duration::from_millis(300),
      max_retries: 1,
      retry_backoff: Duration::from_millis(10),
      pool_size: 2,
    }
  }

  #[test]
  fn sql_lists_occupied_cells_in_store_order() {
    let config = Configuration::empty()
      .with_stone(2, 1, Player::O)
      .with_stone(0, 4, Player::X);
    assert_eq!(
      build_count_sql("ttt_5_l11", &config, OutcomeMark::Win(Player::X)),
      "SELECT COUNT(win_actor) FROM ttt_5_l11 WHERE i15 = 'X' AND i32 = 'O' AND win_actor = 'X'"
    );
    assert_eq!(
      build_count_sql("ttt_5_l12", &config, OutcomeMark::Win(Player::O)),
      "SELECT COUNT(win_actor) FROM ttt_5_l12 WHERE i15 = 'X' AND i32 = 'O' AND win_actor = 'O'"
    );
  }

  #[test]
  fn empty_configuration_filters_on_outcome_only() {
    assert_eq!(
      build_count_sql("ttt_5_draw", &Configuration::empty(), OutcomeMark::Draw),
      "SELECT COUNT(win_actor) FROM ttt_5_draw WHERE win_actor = 'D'"
    );
  }

  #[test]
  fn counts_parse_from_plain_bodies() {
    assert_eq!(parse_count("42\n").unwrap(), 42);
    assert_eq!(parse_count("  ").unwrap(), 0);
    assert!(matches!(parse_count("Code: 60. DB::Exception"), Err(StoreError::Parse(_))));
  }

  #[test]
  fn only_network_failures_are_retried() {
    assert!(is_transient(&StoreError::Timeout(10)));
    assert!(is_transient(&StoreError::Status {
      status: 503,
      body: String::new()
    }));
    assert!(!is_transient(&StoreError::Status {
      status: 404,
      body: String::new()
    }));
    assert!(!is_transient(&StoreError::Parse("x".to_string())));
  }

  #[test]
  fn unreachable_store_reports_an_error() {
    let store = ClickHouseStore::new(settings("http://127.0.0.1:9/")).unwrap();
    let config = Configuration::empty().with_stone(0, 0, Player::X);
    assert!(store.count("ttt_5_l9", &config, OutcomeMark::Win(Player::X)).is_err());
  }

  #[test]
  fn stalled_body_is_cut_off_by_the_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
      for stream in listener.incoming().take(1) {
        let mut stream = stream.unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf);
        let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n4");
        let _ = stream.flush();
        thread::sleep(Duration::from_secs(4));
      }
    });

    let mut settings = settings(&format!("http://{addr}/"));
    settings.max_retries = 0;
    let store = ClickHouseStore::new(settings).unwrap();
    let config = Configuration::empty().with_stone(0, 0, Player::X);

    let started = Instant::now();
    let result = store.count("ttt_5_l9", &config, OutcomeMark::Win(Player::X));
    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
  }

  #[test]
  fn long_bodies_are_truncated() {
    let body = "e".repeat(500);
    assert_eq!(truncate_for_error(&body).len(), 203);
  }
}
