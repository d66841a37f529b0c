//! Compilation of [`Query`] values into parameterised SQLite statements.
//!
//! Each kind maps to a table of the same name whose primary key column is
//! [`PK_COLUMN`]. Table and column names are interpolated only after passing
//! [`is_identifier`]; every value is a bound parameter.
//!
//! Status-registry exclusions compile to a `NOT IN (SELECT ...)` over the
//! registry table, so the excluded id set is read by SQLite when the
//! statement runs rather than fetched ahead of time.

use rusqlite::types::Value as SqlValue;
use vetted_core::{
  Error as CoreError,
  query::{Clause, Predicate, Query, SubQuery},
  record::is_identifier,
};

use crate::{
  Error, Result,
  encode::{encode_status, encode_value},
  schema::REGISTRY_TABLE,
};

/// Primary key column every domain table is expected to have.
pub const PK_COLUMN: &str = "id";

/// A statement ready for `prepare`, with positional parameters in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
  pub sql:    String,
  pub params: Vec<SqlValue>,
}

/// Compile `query` into a `SELECT *` over its kind's table, ordered by
/// primary key.
pub fn compile(query: &Query) -> Result<Compiled> {
  let table = ident(query.kind().as_str())?;
  let mut params = Vec::new();

  let conds = query
    .clauses()
    .iter()
    .map(|clause| match clause {
      Clause::Filter(p) => Ok(format!("({})", predicate(p, &mut params)?)),
      Clause::Exclude(p) => Ok(format!("NOT ({})", predicate(p, &mut params)?)),
    })
    .collect::<Result<Vec<_>>>()?;

  let mut sql = format!("SELECT * FROM \"{table}\" AS r");
  if !conds.is_empty() {
    sql.push_str(" WHERE ");
    sql.push_str(&conds.join(" AND "));
  }
  sql.push_str(&format!(" ORDER BY r.\"{PK_COLUMN}\""));

  // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
  match (query.limit(), query.offset()) {
    (None, None) => {}
    (limit, offset) => {
      sql.push_str(" LIMIT ? OFFSET ?");
      params.push(SqlValue::Integer(limit.map_or(Ok(-1), |l| bound("limit", l))?));
      params.push(SqlValue::Integer(bound("offset", offset.unwrap_or(0))?));
    }
  }

  Ok(Compiled { sql, params })
}

fn predicate(p: &Predicate, params: &mut Vec<SqlValue>) -> Result<String> {
  match p {
    Predicate::Eq { column, value } => {
      let column = ident(column)?;
      params.push(encode_value(value));
      Ok(format!("r.\"{column}\" IS ?"))
    }
    Predicate::PkIn(sub) => {
      Ok(format!("CAST(r.\"{PK_COLUMN}\" AS TEXT) IN ({})", subquery(sub, params)))
    }
  }
}

fn subquery(sub: &SubQuery, params: &mut Vec<SqlValue>) -> String {
  match sub {
    SubQuery::ModeratedPks { content_type, statuses } => {
      params.push(SqlValue::Integer(content_type.0));
      let status_cond = if statuses.is_empty() {
        "0".to_owned()
      } else {
        let marks = vec!["?"; statuses.len()].join(", ");
        params.extend(statuses.iter().map(|s| SqlValue::Text(encode_status(*s).to_owned())));
        format!("m.moderation_status IN ({marks})")
      };
      format!(
        "SELECT m.object_pk FROM {REGISTRY_TABLE} AS m \
         WHERE m.content_type = ? AND {status_cond}"
      )
    }
  }
}

fn bound(name: &'static str, n: usize) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::BoundOutOfRange(name, n))
}

fn ident(name: &str) -> Result<&str> {
  if is_identifier(name) {
    Ok(name)
  } else {
    Err(CoreError::InvalidIdentifier(name.to_owned()).into())
  }
}

#[cfg(test)]
mod tests {
  use vetted_core::{record::KindId, status::ModerationStatus};

  use super::*;

  #[test]
  fn bare_query() {
    let c = compile(&Query::all("article")).unwrap();
    assert_eq!(c.sql, "SELECT * FROM \"article\" AS r ORDER BY r.\"id\"");
    assert!(c.params.is_empty());
  }

  #[test]
  fn status_exclusion_is_a_subquery() {
    let q = Query::all("article").exclude(Predicate::PkIn(SubQuery::ModeratedPks {
      content_type: KindId(1),
      statuses:     ModerationStatus::HIDDEN.to_vec(),
    }));
    let c = compile(&q).unwrap();

    assert_eq!(
      c.sql,
      "SELECT * FROM \"article\" AS r WHERE NOT (CAST(r.\"id\" AS TEXT) IN \
       (SELECT m.object_pk FROM moderated_records AS m \
       WHERE m.content_type = ? AND m.moderation_status IN (?, ?))) ORDER BY r.\"id\""
    );
    assert_eq!(c.params, vec![
      SqlValue::Integer(1),
      SqlValue::Text("pending".into()),
      SqlValue::Text("rejected".into()),
    ]);
  }

  #[test]
  fn column_exclusion_is_null_safe() {
    let q = Query::all("comment").exclude(Predicate::eq("is_hidden", true));
    let c = compile(&q).unwrap();

    assert!(c.sql.contains("WHERE NOT (r.\"is_hidden\" IS ?)"));
    assert_eq!(c.params, vec![SqlValue::Integer(1)]);
  }

  #[test]
  fn params_follow_clause_order() {
    let q = Query::all("comment")
      .filter(Predicate::eq("author", "alice"))
      .exclude(Predicate::eq("is_hidden", true))
      .with_offset(5);
    let c = compile(&q).unwrap();

    assert!(c.sql.ends_with("LIMIT ? OFFSET ?"));
    assert_eq!(c.params, vec![
      SqlValue::Text("alice".into()),
      SqlValue::Integer(1),
      SqlValue::Integer(-1),
      SqlValue::Integer(5),
    ]);
  }

  #[test]
  fn oversized_bounds_are_refused() {
    let err = compile(&Query::all("article").with_limit(usize::MAX)).unwrap_err();
    assert!(matches!(err, Error::BoundOutOfRange("limit", usize::MAX)));

    let err = compile(&Query::all("article").with_offset(usize::MAX)).unwrap_err();
    assert!(matches!(err, Error::BoundOutOfRange("offset", _)));

    let max = i64::MAX as usize;
    let c = compile(&Query::all("article").with_limit(max)).unwrap();
    assert_eq!(c.params, vec![SqlValue::Integer(i64::MAX), SqlValue::Integer(0)]);
  }

  #[test]
  fn hostile_names_are_refused() {
    let err = compile(&Query::all("article\" --")).unwrap_err();
    assert!(matches!(err, crate::Error::Core(CoreError::InvalidIdentifier(_))));

    let q = Query::all("comment").exclude(Predicate::eq("x\" OR 1", true));
    assert!(compile(&q).is_err());
  }
}
