//! Lookup of the status-registry entry belonging to a specific record.

use tracing::debug;

use crate::{
  Error, Result,
  record::Record,
  registry::{ModerationRegistry, TypeRegistry},
  status::{ModeratedRecord, ModerationStatus},
};

/// Maps record instances to their [`ModeratedRecord`] entries.
#[derive(Debug, Clone)]
pub struct ModeratedRecords<R, T> {
  registry: R,
  kinds:    T,
}

impl<R: ModerationRegistry, T: TypeRegistry> ModeratedRecords<R, T> {
  pub fn new(registry: R, kinds: T) -> Self { Self { registry, kinds } }

  pub fn registry(&self) -> &R { &self.registry }

  /// The unique entry for `(record.kind(), record.pk())`.
  ///
  /// Fails with [`Error::NotFound`] when the record never entered moderation,
  /// which includes every record of a kind moderated by visibility column.
  pub async fn get_for_record(&self, record: &impl Record) -> Result<ModeratedRecord> {
    let kind = record.kind();
    let pk = record.pk();
    let content_type = self.kinds.identity_for(&kind)?;

    debug!(%kind, %pk, %content_type, "looking up moderation entry");

    self
      .registry
      .get_entry(content_type, &pk)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound { kind, pk })
  }

  /// Like [`get_for_record`](Self::get_for_record), but a missing entry is
  /// `None` rather than an error.
  pub async fn status_of(&self, record: &impl Record) -> Result<Option<ModerationStatus>> {
    match self.get_for_record(record).await {
      Ok(entry) => Ok(Some(entry.moderation_status)),
      Err(Error::NotFound { .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, convert::Infallible};

  use chrono::Utc;

  use super::*;
  use crate::record::{KindId, RecordId, RecordKind, RecordRef};

  #[derive(Default)]
  struct MemoryRegistry(HashMap<(KindId, RecordId), ModeratedRecord>);

  impl MemoryRegistry {
    fn with(mut self, content_type: i64, pk: i64, status: ModerationStatus) -> Self {
      let entry = ModeratedRecord {
        content_type:      KindId(content_type),
        object_pk:         RecordId::from(pk),
        moderation_status: status,
        reason:            None,
        updated_at:        Utc::now(),
      };
      self.0.insert((entry.content_type, entry.object_pk.clone()), entry);
      self
    }
  }

  impl ModerationRegistry for MemoryRegistry {
    type Error = Infallible;

    async fn get_entry(
      &self,
      content_type: KindId,
      object_pk: &RecordId,
    ) -> Result<Option<ModeratedRecord>, Infallible> {
      Ok(self.0.get(&(content_type, object_pk.clone())).cloned())
    }

    async fn entries(
      &self,
      content_type: KindId,
      statuses: &[ModerationStatus],
    ) -> Result<Vec<ModeratedRecord>, Infallible> {
      Ok(
        self
          .0
          .values()
          .filter(|e| e.content_type == content_type && statuses.contains(&e.moderation_status))
          .cloned()
          .collect(),
      )
    }
  }

  struct Kinds;

  impl TypeRegistry for Kinds {
    fn identity_for(&self, kind: &RecordKind) -> Result<KindId> {
      match kind.as_str() {
        "article" => Ok(KindId(1)),
        "comment" => Ok(KindId(2)),
        _ => Err(Error::UnknownKind(kind.clone())),
      }
    }
  }

  fn accessor() -> ModeratedRecords<MemoryRegistry, Kinds> {
    let registry = MemoryRegistry::default()
      .with(1, 7, ModerationStatus::Approved)
      .with(2, 7, ModerationStatus::Rejected);
    ModeratedRecords::new(registry, Kinds)
  }

  #[tokio::test]
  async fn finds_the_entry_for_the_records_own_kind() {
    let a = accessor();

    let article = a.get_for_record(&RecordRef::new("article", 7_i64)).await.unwrap();
    assert_eq!(article.content_type, KindId(1));
    assert_eq!(article.moderation_status, ModerationStatus::Approved);

    let comment = a.get_for_record(&RecordRef::new("comment", 7_i64)).await.unwrap();
    assert_eq!(comment.content_type, KindId(2));
    assert_eq!(comment.moderation_status, ModerationStatus::Rejected);
  }

  #[tokio::test]
  async fn missing_entry_is_not_found() {
    let a = accessor();
    let err = a.get_for_record(&RecordRef::new("article", 8_i64)).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
      err,
      Error::NotFound { kind, pk } if kind.as_str() == "article" && pk.as_str() == "8"
    ));
  }

  #[tokio::test]
  async fn unknown_kind_propagates() {
    let a = accessor();
    let err = a.get_for_record(&RecordRef::new("page", 7_i64)).await.unwrap_err();
    assert!(matches!(err, Error::UnknownKind(_)));
  }

  #[tokio::test]
  async fn status_of_treats_missing_as_none() {
    let a = accessor();
    assert_eq!(
      a.status_of(&RecordRef::new("comment", 7_i64)).await.unwrap(),
      Some(ModerationStatus::Rejected)
    );
    assert_eq!(a.status_of(&RecordRef::new("comment", 8_i64)).await.unwrap(), None);
  }

  #[tokio::test]
  async fn entries_filter_by_kind_and_status() {
    let a = accessor();
    let hidden = a.registry().entries(KindId(2), &ModerationStatus::HIDDEN).await.unwrap();
    assert_eq!(hidden.len(), 1);
    assert!(a.registry().entries(KindId(1), &ModerationStatus::HIDDEN).await.unwrap().is_empty());
  }
}
