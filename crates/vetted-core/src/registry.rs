//! Collaborator traits the visibility filter is built against.
//!
//! The type registry and configuration provider are synchronous lookups that
//! live in memory. The status registry and the record source are storage
//! backends (e.g. `vetted-store-sqlite`) and return `Send` futures so they can be
//! driven from a multi-threaded runtime.

use std::{future::Future, sync::Arc};

use crate::{
  Result,
  query::Query,
  record::{KindId, RecordId, RecordKind, Row},
  status::{ModeratedRecord, ModerationConfig, ModerationStatus},
};

/// Resolves a kind to its stable identity.
///
/// Identities must be unique per kind and stable for the lifetime of the
/// process, since status-registry entries are keyed by them.
pub trait TypeRegistry {
  /// Fails with [`Error::UnknownKind`](crate::Error::UnknownKind) when the
  /// kind is not registered.
  fn identity_for(&self, kind: &RecordKind) -> Result<KindId>;
}

/// Hands out the moderation configuration of a kind.
pub trait ConfigProvider {
  /// Fails with
  /// [`Error::ConfigurationNotFound`](crate::Error::ConfigurationNotFound)
  /// when the kind is not moderated.
  fn config_for(&self, kind: &RecordKind) -> Result<&ModerationConfig>;
}

impl<T: TypeRegistry + ?Sized> TypeRegistry for &T {
  fn identity_for(&self, kind: &RecordKind) -> Result<KindId> { (**self).identity_for(kind) }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &T {
  fn config_for(&self, kind: &RecordKind) -> Result<&ModerationConfig> {
    (**self).config_for(kind)
  }
}

impl<T: TypeRegistry + ?Sized> TypeRegistry for Arc<T> {
  fn identity_for(&self, kind: &RecordKind) -> Result<KindId> { (**self).identity_for(kind) }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for Arc<T> {
  fn config_for(&self, kind: &RecordKind) -> Result<&ModerationConfig> {
    (**self).config_for(kind)
  }
}

/// Read access to the moderation status registry.
pub trait ModerationRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The entry for exactly `(content_type, object_pk)`, if any.
  fn get_entry<'a>(
    &'a self,
    content_type: KindId,
    object_pk: &'a RecordId,
  ) -> impl Future<Output = Result<Option<ModeratedRecord>, Self::Error>> + Send + 'a;

  /// Every entry of `content_type` whose status is one of `statuses`.
  fn entries<'a>(
    &'a self,
    content_type: KindId,
    statuses: &'a [ModerationStatus],
  ) -> impl Future<Output = Result<Vec<ModeratedRecord>, Self::Error>> + Send + 'a;
}

/// Executes queries against the store holding the domain records.
pub trait RecordSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Materialise `query`. Status-registry sub-queries are evaluated here,
  /// against the registry's state at execution time.
  fn fetch<'a>(
    &'a self,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;
}
