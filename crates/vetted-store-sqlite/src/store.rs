//! [`SqliteStore`], the SQLite implementation of [`ModerationRegistry`] and
//! [`RecordSource`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use vetted_core::{
  query::Query,
  record::{KindId, RecordId, Row},
  registry::{ModerationRegistry, RecordSource},
  status::{ModeratedRecord, ModerationStatus},
};

use crate::{
  Result,
  encode::{RawModeratedRecord, decode_row, encode_dt, encode_status},
  schema::SCHEMA,
  sql::{Compiled, compile},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A status registry and record source backed by a single SQLite file.
///
/// Domain tables are expected to live in the same database so exclusion
/// sub-queries can reference the registry directly.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run arbitrary SQL, e.g. to create or populate domain tables.
  pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Set the moderation status of `(content_type, object_pk)`, creating the
  /// entry if the record has not been moderated before.
  ///
  /// This is the write side used by the review workflow; the registry never
  /// holds more than one entry per record.
  pub async fn record_status(
    &self,
    content_type: KindId,
    object_pk:    &RecordId,
    status:       ModerationStatus,
    reason:       Option<String>,
  ) -> Result<ModeratedRecord> {
    let entry = ModeratedRecord {
      content_type,
      object_pk: object_pk.clone(),
      moderation_status: status,
      reason,
      updated_at: Utc::now(),
    };

    let pk_str     = entry.object_pk.as_str().to_owned();
    let status_str = encode_status(status);
    let reason     = entry.reason.clone();
    let at_str     = encode_dt(entry.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO moderated_records
             (content_type, object_pk, moderation_status, reason, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (content_type, object_pk) DO UPDATE SET
             moderation_status = excluded.moderation_status,
             reason            = excluded.reason,
             updated_at        = excluded.updated_at",
          rusqlite::params![content_type.0, pk_str, status_str, reason, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(%content_type, pk = %entry.object_pk, %status, "recorded moderation status");
    Ok(entry)
  }
}

// ─── ModerationRegistry impl ─────────────────────────────────────────────────

impl ModerationRegistry for SqliteStore {
  type Error = crate::Error;

  async fn get_entry(
    &self,
    content_type: KindId,
    object_pk:    &RecordId,
  ) -> Result<Option<ModeratedRecord>> {
    let pk_str = object_pk.as_str().to_owned();

    let raw: Option<RawModeratedRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT content_type, object_pk, moderation_status, reason, updated_at
               FROM moderated_records
               WHERE content_type = ?1 AND object_pk = ?2",
              rusqlite::params![content_type.0, pk_str],
              RawModeratedRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawModeratedRecord::into_record).transpose()
  }

  async fn entries(
    &self,
    content_type: KindId,
    statuses:     &[ModerationStatus],
  ) -> Result<Vec<ModeratedRecord>> {
    if statuses.is_empty() {
      return Ok(Vec::new());
    }

    let marks = vec!["?"; statuses.len()].join(", ");
    let sql = format!(
      "SELECT content_type, object_pk, moderation_status, reason, updated_at
       FROM moderated_records
       WHERE content_type = ? AND moderation_status IN ({marks})
       ORDER BY object_pk"
    );
    let mut params = vec![rusqlite::types::Value::Integer(content_type.0)];
    params.extend(
      statuses
        .iter()
        .map(|s| rusqlite::types::Value::Text(encode_status(*s).to_owned())),
    );

    let raws: Vec<RawModeratedRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawModeratedRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawModeratedRecord::into_record).collect()
  }
}

// ─── RecordSource impl ───────────────────────────────────────────────────────

impl RecordSource for SqliteStore {
  type Error = crate::Error;

  async fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
    let Compiled { sql, params } = compile(query)?;
    debug!(kind = %query.kind(), %sql, "executing query");

    let (columns, raws): (Vec<String>, Vec<Vec<rusqlite::types::Value>>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();
        let width = columns.len();

        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            (0..width)
              .map(|i| row.get::<_, rusqlite::types::Value>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((columns, rows))
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| decode_row(query.kind(), &columns, raw))
      .collect()
  }
}
