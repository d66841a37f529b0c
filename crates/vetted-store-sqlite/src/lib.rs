//! SQLite backend for moderated record visibility.
//!
//! Holds the moderation status registry and executes
//! [`Query`](vetted_core::query::Query)s against domain tables living in the
//! same database. Wraps [`tokio_rusqlite`] so all database access runs on a
//! dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use sql::{Compiled, PK_COLUMN, compile};
pub use store::SqliteStore;
