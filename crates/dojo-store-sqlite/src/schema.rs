//! SQL schema for the Dojo SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS competitors (
    competitor_id TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL CHECK (length(trim(name)) > 0),
    age           INTEGER CHECK (age IS NULL OR age >= 0),
    master        TEXT,
    belt          TEXT,
    weight        TEXT,   -- free-form label, e.g. '35kg' or '22-35kg'
    district      TEXT,
    city          TEXT,
    email         TEXT
);

-- Players are JSON snapshots, not foreign keys: deleting or editing a
-- competitor never changes a match.
CREATE TABLE IF NOT EXISTS matches (
    match_id      TEXT PRIMARY KEY,
    match_number  INTEGER NOT NULL CHECK (match_number > 0),
    player1       TEXT NOT NULL,
    player2       TEXT NOT NULL,
    player1_marks REAL,
    player2_marks REAL,
    winner        TEXT,
    match_type    TEXT NOT NULL CHECK (match_type IN ('auto', 'manual')),
    status        TEXT NOT NULL CHECK (status IN ('scheduled', 'completed')),
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS competitors_age_idx  ON competitors(age);
CREATE INDEX IF NOT EXISTS matches_number_idx   ON matches(match_number);

PRAGMA user_version = 1;
";
