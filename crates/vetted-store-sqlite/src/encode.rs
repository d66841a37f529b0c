//! Encoding and decoding helpers between domain types and the values stored
//! in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and statuses by their lowercase
//! name. SQLite has no boolean type, so `Value::Bool` is bound as `0`/`1` and
//! read back as an integer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use vetted_core::{
  record::{KindId, RecordId, RecordKind, Row, Value},
  status::{ModeratedRecord, ModerationStatus},
};

use crate::{Error, Result, sql::PK_COLUMN};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ModerationStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: ModerationStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<ModerationStatus> { Ok(s.parse()?) }

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_value(v: &Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(t) => SqlValue::Text(t.clone()),
    Value::Blob(b) => SqlValue::Blob(b.clone()),
  }
}

pub fn decode_value(v: SqlValue) -> Value {
  match v {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(i) => Value::Integer(i),
    SqlValue::Real(r) => Value::Real(r),
    SqlValue::Text(t) => Value::Text(t),
    SqlValue::Blob(b) => Value::Blob(b),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `moderated_records` row.
pub struct RawModeratedRecord {
  pub content_type:      i64,
  pub object_pk:         String,
  pub moderation_status: String,
  pub reason:            Option<String>,
  pub updated_at:        String,
}

impl RawModeratedRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      content_type:      row.get(0)?,
      object_pk:         row.get(1)?,
      moderation_status: row.get(2)?,
      reason:            row.get(3)?,
      updated_at:        row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<ModeratedRecord> {
    Ok(ModeratedRecord {
      content_type:      KindId(self.content_type),
      object_pk:         RecordId::new(self.object_pk),
      moderation_status: decode_status(&self.moderation_status)?,
      reason:            self.reason,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Column names and values of one domain-table row, in select order.
pub fn decode_row(kind: &RecordKind, columns: &[String], raw: Vec<SqlValue>) -> Result<Row> {
  let values: BTreeMap<String, Value> =
    columns.iter().cloned().zip(raw.into_iter().map(decode_value)).collect();

  let pk = match values.get(PK_COLUMN) {
    Some(Value::Integer(i)) => RecordId::from(*i),
    Some(Value::Text(t)) => RecordId::new(t.as_str()),
    _ => return Err(Error::MissingPrimaryKey(kind.as_str().to_owned())),
  };

  Ok(Row { kind: kind.clone(), pk, values })
}
