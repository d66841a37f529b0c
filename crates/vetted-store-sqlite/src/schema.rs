//! SQL schema for the moderation status registry.
//!
//! Executed once at connection startup. Domain tables are owned by the
//! application and are not created here.

/// Name of the status registry table.
pub const REGISTRY_TABLE: &str = "moderated_records";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per moderated domain record. object_pk is the record's primary
-- key as text so kinds with integer and text keys share the table.
CREATE TABLE IF NOT EXISTS moderated_records (
    content_type      INTEGER NOT NULL,
    object_pk         TEXT    NOT NULL,
    moderation_status TEXT    NOT NULL
                      CHECK (moderation_status IN ('pending', 'approved', 'rejected')),
    reason            TEXT,
    updated_at        TEXT    NOT NULL,   -- ISO 8601 UTC
    PRIMARY KEY (content_type, object_pk)
);

-- Serves the exclusion sub-query: content_type = ? AND moderation_status IN (...).
CREATE INDEX IF NOT EXISTS moderated_records_status_idx
    ON moderated_records(content_type, moderation_status);

PRAGMA user_version = 1;
";
