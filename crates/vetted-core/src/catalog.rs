//! [`KindCatalog`], the configured set of moderated kinds.
//!
//! A catalog is built once at startup, usually from the `kinds` table of the
//! configuration file, and then serves as both the [`TypeRegistry`] and the
//! [`ConfigProvider`] handed to the filter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{KindId, RecordKind, is_identifier},
  registry::{ConfigProvider, TypeRegistry},
  status::ModerationConfig,
};

/// Per-kind settings as they appear in configuration.
///
/// ```toml
/// [kinds.comment]
/// content_type      = 2
/// visibility_column = "is_hidden"
/// ```
///
/// Not flattened from [`ModerationConfig`]: environment overrides arrive as
/// strings, and only typed fields coerce them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSettings {
  pub content_type:      i64,
  #[serde(default)]
  pub visibility_column: Option<String>,
  #[serde(default = "default_hidden_value")]
  pub hidden_value:      bool,
}

fn default_hidden_value() -> bool { true }

impl KindSettings {
  pub fn moderation(&self) -> ModerationConfig {
    ModerationConfig {
      visibility_column: self.visibility_column.clone(),
      hidden_value:      self.hidden_value,
    }
  }
}

#[derive(Debug, Clone)]
struct Entry {
  id:     KindId,
  config: ModerationConfig,
}

/// Moderated kinds, their identities, and their configurations.
#[derive(Debug, Clone, Default)]
pub struct KindCatalog {
  entries: BTreeMap<RecordKind, Entry>,
}

impl KindCatalog {
  pub fn new() -> Self { Self::default() }

  /// Build a catalog from configuration, keyed by kind name.
  pub fn from_settings<'a>(
    settings: impl IntoIterator<Item = (&'a String, &'a KindSettings)>,
  ) -> Result<Self> {
    let mut catalog = Self::new();
    for (name, kind) in settings {
      catalog.register(
        RecordKind::new(name.as_str()),
        KindId(kind.content_type),
        kind.moderation(),
      )?;
    }
    Ok(catalog)
  }

  /// Add or replace a kind.
  ///
  /// Kind and column names must be plain identifiers, and no two kinds may
  /// share a content type.
  pub fn register(
    &mut self,
    kind: RecordKind,
    id: KindId,
    config: ModerationConfig,
  ) -> Result<()> {
    if !is_identifier(kind.as_str()) {
      return Err(Error::InvalidIdentifier(kind.as_str().to_owned()));
    }
    if let Some(column) = config.visibility_column.as_deref()
      && !column.is_empty()
      && !is_identifier(column)
    {
      return Err(Error::InvalidIdentifier(column.to_owned()));
    }
    if let Some((existing, _)) =
      self.entries.iter().find(|(other, e)| e.id == id && **other != kind)
    {
      return Err(Error::DuplicateKindId { content_type: id, existing: existing.clone() });
    }

    self.entries.insert(kind, Entry { id, config });
    Ok(())
  }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Every registered kind in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&RecordKind, KindId, &ModerationConfig)> {
    self.entries.iter().map(|(kind, e)| (kind, e.id, &e.config))
  }
}

impl TypeRegistry for KindCatalog {
  fn identity_for(&self, kind: &RecordKind) -> Result<KindId> {
    self.entries.get(kind).map(|e| e.id).ok_or_else(|| Error::UnknownKind(kind.clone()))
  }
}

impl ConfigProvider for KindCatalog {
  fn config_for(&self, kind: &RecordKind) -> Result<&ModerationConfig> {
    self
      .entries
      .get(kind)
      .map(|e| &e.config)
      .ok_or_else(|| Error::ConfigurationNotFound(kind.clone()))
  }
}
