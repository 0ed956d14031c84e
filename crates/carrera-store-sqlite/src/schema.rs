//! SQL schema for the participant store.
//!
//! Executed at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Participants are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS participants (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    sex             TEXT NOT NULL,          -- 'Masculino' | 'Femenino'
    phone           TEXT NOT NULL UNIQUE,   -- trimmed
    sector          TEXT NOT NULL,
    registered_at   TEXT NOT NULL,          -- RFC 3339 UTC, fixed width
    assigned_number TEXT NOT NULL UNIQUE    -- id zero-padded to 4 digits
);

CREATE INDEX IF NOT EXISTS participants_registered_idx
    ON participants(registered_at);

PRAGMA user_version = 1;
";
