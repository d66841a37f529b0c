//! Core types and trait definitions for moderated record visibility.
//!
//! This crate is deliberately free of database dependencies. It decides
//! *which* records of a moderated kind may be shown and expresses that
//! decision as an unexecuted [`Query`](query::Query); storage backends (e.g.
//! `vetted-store-sqlite`) execute it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod accessor;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod query;
pub mod record;
pub mod registry;
pub mod status;

pub use error::{Error, Result};
