//! The lazily-evaluated query builder and the [`Collection`] seam.
//!
//! A [`Query`] describes a set of records of one kind. It never touches a
//! store: building, narrowing and cloning are pure, and I/O only happens when
//! a [`RecordSource`](crate::registry::RecordSource) executes it.

use serde::Serialize;

use crate::{
  Result,
  record::{KindId, RecordKind, Value},
  status::ModerationStatus,
};

// ─── Predicates ──────────────────────────────────────────────────────────────

/// An id-only projection evaluated by the store at execution time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubQuery {
  /// `object_pk` of every status-registry entry for `content_type` whose
  /// status is one of `statuses`.
  ModeratedPks {
    content_type: KindId,
    statuses:     Vec<ModerationStatus>,
  },
}

/// A row-level condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
  /// Null-safe equality: a NULL column never equals a non-null value.
  Eq { column: String, value: Value },
  /// The record's primary key is produced by the sub-query.
  PkIn(SubQuery),
}

impl Predicate {
  pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::Eq { column: column.into(), value: value.into() }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "clause", content = "predicate", rename_all = "snake_case")]
pub enum Clause {
  /// Keep only records matching the predicate.
  Filter(Predicate),
  /// Drop records matching the predicate.
  Exclude(Predicate),
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// An unexecuted, immutable query over the records of one kind.
///
/// Every builder method consumes `self` and returns the narrowed query, so a
/// caller holding a clone of the original still sees the original. Clauses
/// are ANDed together in order; adding a clause that is already present is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
  kind:    RecordKind,
  clauses: Vec<Clause>,
  limit:   Option<usize>,
  offset:  Option<usize>,
}

impl Query {
  /// Every record of `kind`.
  pub fn all(kind: impl Into<RecordKind>) -> Self {
    Self { kind: kind.into(), clauses: Vec::new(), limit: None, offset: None }
  }

  /// The kind this query ranges over.
  pub fn kind(&self) -> &RecordKind { &self.kind }

  pub fn clauses(&self) -> &[Clause] { &self.clauses }

  pub fn limit(&self) -> Option<usize> { self.limit }

  pub fn offset(&self) -> Option<usize> { self.offset }

  pub fn filter(self, predicate: Predicate) -> Self { self.push(Clause::Filter(predicate)) }

  pub fn exclude(self, predicate: Predicate) -> Self { self.push(Clause::Exclude(predicate)) }

  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn with_offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }

  fn push(mut self, clause: Clause) -> Self {
    if !self.clauses.contains(&clause) {
      self.clauses.push(clause);
    }
    self
  }
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// Anything that hands out the default query for a kind.
///
/// Decorators such as [`Moderated`](crate::filter::Moderated) wrap another
/// collection and narrow what it returns.
pub trait Collection {
  fn query(&self) -> Result<Query>;
}

/// The unfiltered collection of every record of a kind.
#[derive(Debug, Clone)]
pub struct AllRecords {
  kind: RecordKind,
}

impl AllRecords {
  pub fn new(kind: impl Into<RecordKind>) -> Self { Self { kind: kind.into() } }
}

impl Collection for AllRecords {
  fn query(&self) -> Result<Query> { Ok(Query::all(self.kind.clone())) }
}

/// A prebuilt query is itself a collection.
impl Collection for Query {
  fn query(&self) -> Result<Query> { Ok(self.clone()) }
}
