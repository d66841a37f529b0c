//! Error type for `vetted-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] vetted_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The kind's table has no `id` column, or it holds neither an integer nor
  /// text.
  #[error("table {0:?} has no usable primary key column")]
  MissingPrimaryKey(String),

  #[error("{0} of {1} is beyond what SQLite can bind")]
  BoundOutOfRange(&'static str, usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
