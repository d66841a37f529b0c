//! Moderation state: the three-state status, per-record entries and per-kind
//! configuration.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  record::{KindId, RecordId},
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a record is in the moderation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
  Pending,
  Approved,
  Rejected,
}

impl ModerationStatus {
  /// Statuses that hide a record under the status-registry strategy.
  pub const HIDDEN: [Self; 2] = [Self::Pending, Self::Rejected];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }

  pub fn is_visible(self) -> bool { matches!(self, Self::Approved) }
}

impl fmt::Display for ModerationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ModerationStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "approved" => Ok(Self::Approved),
      "rejected" => Ok(Self::Rejected),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// The moderation state of exactly one domain record.
///
/// At most one entry exists per `(content_type, object_pk)`. Entries are
/// written by the review workflow; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratedRecord {
  pub content_type:      KindId,
  pub object_pk:         RecordId,
  pub moderation_status: ModerationStatus,
  pub reason:            Option<String>,
  pub updated_at:        DateTime<Utc>,
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// How a kind is moderated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationConfig {
  /// Name of a boolean column on the record itself. When set, it replaces
  /// the status registry for this kind.
  #[serde(default)]
  pub visibility_column: Option<String>,
  /// Column value that marks a record hidden.
  #[serde(default = "default_hidden_value")]
  pub hidden_value:      bool,
}

fn default_hidden_value() -> bool { true }

impl Default for ModerationConfig {
  fn default() -> Self { Self::status_registry() }
}

/// The exclusion strategy a [`ModerationConfig`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy<'a> {
  StatusRegistry,
  VisibilityColumn { column: &'a str, hidden_value: bool },
}

impl ModerationConfig {
  pub fn status_registry() -> Self {
    Self { visibility_column: None, hidden_value: true }
  }

  pub fn visibility_column(column: impl Into<String>) -> Self {
    Self { visibility_column: Some(column.into()), hidden_value: true }
  }

  pub fn with_hidden_value(mut self, hidden_value: bool) -> Self {
    self.hidden_value = hidden_value;
    self
  }

  /// An empty column name counts as unset.
  pub fn strategy(&self) -> Strategy<'_> {
    match self.visibility_column.as_deref() {
      Some(column) if !column.is_empty() => Strategy::VisibilityColumn {
        column,
        hidden_value: self.hidden_value,
      },
      _ => Strategy::StatusRegistry,
    }
  }
}
