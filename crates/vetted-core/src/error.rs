//! Error types for `vetted-core`.

use thiserror::Error;

use crate::record::{KindId, RecordId, RecordKind};

#[derive(Debug, Error)]
pub enum Error {
  /// The kind has no moderation configuration. Always an integration bug;
  /// never defaulted to an empty or unfiltered result.
  #[error("no moderation configuration registered for kind {0}")]
  ConfigurationNotFound(RecordKind),

  #[error("type registry has no identity for kind {0}")]
  UnknownKind(RecordKind),

  #[error("no moderation entry for {kind} record {pk}")]
  NotFound { kind: RecordKind, pk: RecordId },

  #[error("content type {content_type} is already registered to kind {existing}")]
  DuplicateKindId { content_type: KindId, existing: RecordKind },

  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("unknown moderation status: {0:?}")]
  UnknownStatus(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error without altering it.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
