//! SQL schema for the Margin SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS documents (
    document_id     TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    title           TEXT NOT NULL,
    body            TEXT NOT NULL,
    source_address  TEXT,
    public_share_id TEXT UNIQUE,
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at      TEXT NOT NULL
);

-- Version records are strictly append-only and have no foreign key to
-- documents: history is kept after the document is destroyed.
CREATE TABLE IF NOT EXISTS versions (
    document_id     TEXT    NOT NULL,
    sequence_number INTEGER NOT NULL CHECK (sequence_number >= 1),
    snapshot_title  TEXT    NOT NULL,
    snapshot_body   TEXT    NOT NULL,
    event_kind      TEXT    NOT NULL,   -- 'created' | 'updated' | 'appended'
    recorded_at     TEXT    NOT NULL,
    PRIMARY KEY (document_id, sequence_number)
);

CREATE TRIGGER IF NOT EXISTS versions_no_update
BEFORE UPDATE ON versions
BEGIN
    SELECT RAISE(ABORT, 'version records are immutable');
END;

CREATE TRIGGER IF NOT EXISTS versions_no_delete
BEFORE DELETE ON versions
BEGIN
    SELECT RAISE(ABORT, 'version records are immutable');
END;

-- Identity mapping, maintained by account management.
CREATE TABLE IF NOT EXISTS user_emails (
    email    TEXT PRIMARY KEY COLLATE NOCASE,
    owner_id TEXT NOT NULL
);

-- Inbound messages already applied, keyed by the relay's Message-Id.
CREATE TABLE IF NOT EXISTS processed_messages (
    message_id  TEXT PRIMARY KEY,
    document_id TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_owner_idx ON documents(owner_id, updated_at);

PRAGMA user_version = 1;
";
