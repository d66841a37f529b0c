//! The visible-set filter and the [`Moderated`] collection decorator.
//!
//! Given the default query for a kind, the filter returns the same query
//! narrowed to records that moderation does not hide. The kind's
//! [`ModerationConfig`](crate::status::ModerationConfig) selects one of two
//! mutually exclusive strategies:
//!
//! - **visibility column**: drop records whose flag column holds the hidden
//!   value. Neither the type registry nor the status registry is consulted.
//! - **status registry**: drop records with a `pending` or `rejected` entry.
//!   Records that were never submitted stay visible. The exclusion set is a
//!   sub-query evaluated by the store, not a list fetched up front.

use tracing::debug;

use crate::{
  Result,
  query::{Collection, Predicate, Query, SubQuery},
  registry::{ConfigProvider, TypeRegistry},
  status::{ModerationStatus, Strategy},
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Narrows default queries to their moderation-visible subset.
///
/// Both collaborators are injected at construction; nothing is looked up
/// from global state.
#[derive(Debug, Clone)]
pub struct VisibleSetFilter<C, T> {
  configs: C,
  kinds:   T,
}

impl<C: ConfigProvider, T: TypeRegistry> VisibleSetFilter<C, T> {
  pub fn new(configs: C, kinds: T) -> Self { Self { configs, kinds } }

  /// A filter borrowing this one's collaborators.
  pub fn by_ref(&self) -> VisibleSetFilter<&C, &T> {
    VisibleSetFilter { configs: &self.configs, kinds: &self.kinds }
  }

  /// Narrow `query` to the records moderation leaves visible.
  ///
  /// Performs no I/O. Applying it to its own output returns that output
  /// unchanged. Fails with `ConfigurationNotFound` for an unmoderated kind
  /// and with `UnknownKind` when the type registry cannot resolve it.
  pub fn get_visible(&self, query: Query) -> Result<Query> {
    let config = self.configs.config_for(query.kind())?;

    match config.strategy() {
      Strategy::VisibilityColumn { column, hidden_value } => {
        debug!(kind = %query.kind(), column, hidden_value, "excluding by visibility column");
        Ok(exclude_by_visibility_column(query, column, hidden_value))
      }
      Strategy::StatusRegistry => {
        debug!(kind = %query.kind(), "excluding by status registry");
        self.exclude_by_status_registry(query)
      }
    }
  }

  /// Drop records with a `pending` or `rejected` registry entry.
  pub fn exclude_by_status_registry(&self, query: Query) -> Result<Query> {
    let content_type = self.kinds.identity_for(query.kind())?;
    Ok(query.exclude(Predicate::PkIn(SubQuery::ModeratedPks {
      content_type,
      statuses: ModerationStatus::HIDDEN.to_vec(),
    })))
  }
}

/// Drop records whose `column` holds `hidden_value`. Records where the column
/// is NULL or holds the other value remain.
pub fn exclude_by_visibility_column(query: Query, column: &str, hidden_value: bool) -> Query {
  query.exclude(Predicate::eq(column, hidden_value))
}

// ─── Decorator ───────────────────────────────────────────────────────────────

/// Wraps a base collection so that every query it hands out is narrowed to
/// the moderation-visible subset.
#[derive(Debug, Clone)]
pub struct Moderated<B, C, T> {
  base:   B,
  filter: VisibleSetFilter<C, T>,
}

impl<B, C, T> Moderated<B, C, T>
where
  B: Collection,
  C: ConfigProvider,
  T: TypeRegistry,
{
  pub fn new(base: B, filter: VisibleSetFilter<C, T>) -> Self { Self { base, filter } }

  /// The undecorated collection.
  pub fn base(&self) -> &B { &self.base }
}

impl<B, C, T> Collection for Moderated<B, C, T>
where
  B: Collection,
  C: ConfigProvider,
  T: TypeRegistry,
{
  fn query(&self) -> Result<Query> { self.filter.get_visible(self.base.query()?) }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, collections::HashMap};

  use super::*;
  use crate::{
    Error,
    query::{AllRecords, Clause},
    record::{KindId, RecordKind},
    status::ModerationConfig,
  };

  struct Configs(HashMap<RecordKind, ModerationConfig>);

  impl ConfigProvider for Configs {
    fn config_for(&self, kind: &RecordKind) -> Result<&ModerationConfig> {
      self.0.get(kind).ok_or_else(|| Error::ConfigurationNotFound(kind.clone()))
    }
  }

  /// Type registry that counts lookups.
  #[derive(Default)]
  struct Kinds {
    lookups: Cell<usize>,
  }

  impl TypeRegistry for Kinds {
    fn identity_for(&self, kind: &RecordKind) -> Result<KindId> {
      self.lookups.set(self.lookups.get() + 1);
      match kind.as_str() {
        "article" => Ok(KindId(1)),
        "comment" => Ok(KindId(2)),
        _ => Err(Error::UnknownKind(kind.clone())),
      }
    }
  }

  fn filter() -> VisibleSetFilter<Configs, Kinds> {
    let configs = Configs(HashMap::from([
      (RecordKind::new("article"), ModerationConfig::status_registry()),
      (RecordKind::new("comment"), ModerationConfig::visibility_column("is_hidden")),
      (RecordKind::new("orphan"), ModerationConfig::status_registry()),
    ]));
    VisibleSetFilter::new(configs, Kinds::default())
  }

  fn hidden_pks(content_type: i64) -> Clause {
    Clause::Exclude(Predicate::PkIn(SubQuery::ModeratedPks {
      content_type: KindId(content_type),
      statuses:     vec![ModerationStatus::Pending, ModerationStatus::Rejected],
    }))
  }

  #[test]
  fn status_registry_kind_excludes_pending_and_rejected_pks() {
    let f = filter();
    let q = f.get_visible(Query::all("article")).unwrap();

    assert_eq!(q.kind().as_str(), "article");
    assert_eq!(q.clauses(), &[hidden_pks(1)]);
  }

  #[test]
  fn visibility_column_kind_never_resolves_identity() {
    let f = filter();
    let q = f.get_visible(Query::all("comment")).unwrap();

    assert_eq!(q.clauses(), &[Clause::Exclude(Predicate::eq("is_hidden", true))]);
    assert_eq!(f.kinds.lookups.get(), 0);
  }

  #[test]
  fn unconfigured_kind_is_an_error() {
    let f = filter();
    let err = f.get_visible(Query::all("page")).unwrap_err();
    assert!(matches!(err, Error::ConfigurationNotFound(k) if k.as_str() == "page"));
  }

  #[test]
  fn unresolvable_kind_is_an_error() {
    let f = filter();
    let err = f.get_visible(Query::all("orphan")).unwrap_err();
    assert!(matches!(err, Error::UnknownKind(k) if k.as_str() == "orphan"));
  }

  #[test]
  fn get_visible_is_idempotent() {
    let f = filter();
    for kind in ["article", "comment"] {
      let once = f.get_visible(Query::all(kind)).unwrap();
      let twice = f.get_visible(once.clone()).unwrap();
      assert_eq!(once, twice);
    }
  }

  #[test]
  fn existing_clauses_are_preserved() {
    let f = filter();
    let base = Query::all("article").filter(Predicate::eq("published", true)).with_limit(5);
    let q = f.get_visible(base.clone()).unwrap();

    assert_eq!(q.clauses()[0], base.clauses()[0]);
    assert_eq!(q.clauses()[1], hidden_pks(1));
    assert_eq!(q.limit(), Some(5));
  }

  #[test]
  fn moderated_collection_narrows_its_base() {
    let f = filter();
    let comments = Moderated::new(AllRecords::new("comment"), f.by_ref());

    assert_eq!(
      comments.query().unwrap(),
      Query::all("comment").exclude(Predicate::eq("is_hidden", true))
    );
    assert_eq!(comments.base().query().unwrap(), Query::all("comment"));
  }

  #[test]
  fn moderated_collections_stack() {
    let f = filter();
    let inner = Moderated::new(AllRecords::new("article"), f.by_ref());
    let outer = Moderated::new(inner, f.by_ref());

    assert_eq!(outer.query().unwrap().clauses(), &[hidden_pks(1)]);
  }
}
