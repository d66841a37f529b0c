//! Record identity: kinds, primary keys and attribute values.
//!
//! Domain records are never embedded in moderation state. They are referred
//! to by `(kind, primary key)`, with the primary key kept as an opaque string
//! so kinds keyed by integers and kinds keyed by text share one registry.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The name of a domain record type (e.g. `article`).
///
/// Backends map a kind to the table holding its records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKind(String);

impl RecordKind {
  pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RecordKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for RecordKind {
  fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for RecordKind {
  fn from(s: String) -> Self { Self(s) }
}

/// Stable identity of a kind as resolved by a
/// [`TypeRegistry`](crate::registry::TypeRegistry). This is the value stored
/// in the `content_type` column of the status registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(pub i64);

impl fmt::Display for KindId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Primary keys ────────────────────────────────────────────────────────────

/// Opaque primary key of a domain record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
  pub fn new(pk: impl Into<String>) -> Self { Self(pk.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<i64> for RecordId {
  fn from(pk: i64) -> Self { Self(pk.to_string()) }
}

impl From<&str> for RecordId {
  fn from(pk: &str) -> Self { Self(pk.to_owned()) }
}

impl From<String> for RecordId {
  fn from(pk: String) -> Self { Self(pk) }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single attribute value of a domain record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self { Self::Integer(i) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted domain record: anything that knows its kind and primary key.
pub trait Record {
  fn kind(&self) -> RecordKind;

  fn pk(&self) -> RecordId;
}

/// A bare `(kind, pk)` reference to a record that has not been loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
  pub kind: RecordKind,
  pub pk:   RecordId,
}

impl RecordRef {
  pub fn new(kind: impl Into<RecordKind>, pk: impl Into<RecordId>) -> Self {
    Self { kind: kind.into(), pk: pk.into() }
  }
}

impl Record for RecordRef {
  fn kind(&self) -> RecordKind { self.kind.clone() }

  fn pk(&self) -> RecordId { self.pk.clone() }
}

/// One row produced by executing a [`Query`](crate::query::Query).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
  pub kind:   RecordKind,
  pub pk:     RecordId,
  /// Every column of the row, primary key included.
  pub values: BTreeMap<String, Value>,
}

impl Row {
  pub fn get(&self, column: &str) -> Option<&Value> { self.values.get(column) }
}

impl Record for Row {
  fn kind(&self) -> RecordKind { self.kind.clone() }

  fn pk(&self) -> RecordId { self.pk.clone() }
}

/// Whether `s` can be used verbatim as a table or column name.
pub fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifiers() {
    assert!(is_identifier("article"));
    assert!(is_identifier("_is_hidden2"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("2fast"));
    assert!(!is_identifier("articles; DROP TABLE x"));
    assert!(!is_identifier("is-hidden"));
  }

  #[test]
  fn integer_pks_are_opaque_strings() {
    assert_eq!(RecordId::from(42_i64), RecordId::from("42"));
    assert_eq!(RecordId::from(42_i64).to_string(), "42");
  }
}
