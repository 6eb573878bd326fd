//! SQL schema for the Quarry SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS groups (
    group_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'lobby',  -- 'lobby' | 'active' | 'ended'
    created_at  TEXT NOT NULL,                  -- ISO 8601 UTC
    started_at  TEXT,
    ended_at    TEXT
);

-- Players are never deleted; eliminations and removals flip status.
CREATE TABLE IF NOT EXISTS players (
    player_id        TEXT PRIMARY KEY,
    group_id         TEXT NOT NULL REFERENCES groups(group_id),
    display_name     TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'waiting',
    owner_profile_id TEXT,
    created_at       TEXT NOT NULL,
    deactivated_at   TEXT
);

-- Assignments are append-mostly. dare_text may change while an edge is
-- open; closing happens exactly once; no DELETE is ever issued.
CREATE TABLE IF NOT EXISTS assignments (
    assignment_id TEXT PRIMARY KEY,
    group_id      TEXT NOT NULL REFERENCES groups(group_id),
    assassin_id   TEXT NOT NULL REFERENCES players(player_id),
    target_id     TEXT NOT NULL REFERENCES players(player_id),
    dare_text     TEXT NOT NULL DEFAULT '',
    created_at    TEXT NOT NULL,
    closed_at     TEXT,
    reason_closed TEXT,   -- 'eliminated' | 'reseed' | 'removed'
    replaced_by   TEXT REFERENCES assignments(assignment_id) DEFERRABLE INITIALLY DEFERRED,
    CHECK (assassin_id != target_id),
    CHECK ((closed_at IS NULL) = (reason_closed IS NULL))
);

-- At most one open edge per assassin and per target within a group.
CREATE UNIQUE INDEX IF NOT EXISTS assignments_open_assassin_idx
    ON assignments(group_id, assassin_id) WHERE closed_at IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS assignments_open_target_idx
    ON assignments(group_id, target_id) WHERE closed_at IS NULL;

CREATE INDEX IF NOT EXISTS players_group_idx     ON players(group_id);
CREATE INDEX IF NOT EXISTS assignments_group_idx ON assignments(group_id);

CREATE TABLE IF NOT EXISTS dare_templates (
    template_id TEXT PRIMARY KEY,
    group_id    TEXT NOT NULL REFERENCES groups(group_id),
    text        TEXT NOT NULL,
    difficulty  TEXT NOT NULL DEFAULT 'easy',
    tags        TEXT NOT NULL DEFAULT '[]',
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS dare_templates_group_idx
    ON dare_templates(group_id);

PRAGMA user_version = 1;
";
