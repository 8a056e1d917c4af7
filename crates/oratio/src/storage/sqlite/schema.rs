//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Prayer entries table
CREATE TABLE IF NOT EXISTS prayers (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    clicked_as_prayed_over_count INTEGER NOT NULL DEFAULT 0,
    has_been_changed INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL,
    is_ai_generated INTEGER NOT NULL DEFAULT 0,
    ai_generation_references TEXT
);

-- Per-user daily AI-generation counters
CREATE TABLE IF NOT EXISTS generation_quota (
    owner_key TEXT NOT NULL,
    date TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (owner_key, date)
);

-- Per-IP daily signup counters
CREATE TABLE IF NOT EXISTS signup_throttle (
    owner_key TEXT NOT NULL,
    date TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (owner_key, date)
);

-- Index for newest-first listing
CREATE INDEX IF NOT EXISTS idx_prayers_created_at ON prayers(created_at);
"#;

// Prayer queries
pub const INSERT_PRAYER: &str = r#"
INSERT INTO prayers (id, text, created_at, updated_at, clicked_as_prayed_over_count,
                     has_been_changed, status, is_ai_generated, ai_generation_references)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_PRAYER_BY_ID: &str = r#"
SELECT id, text, created_at, updated_at, clicked_as_prayed_over_count,
       has_been_changed, status, is_ai_generated, ai_generation_references
FROM prayers
WHERE id = ?1
"#;

pub const SELECT_ALL_PRAYERS: &str = r#"
SELECT id, text, created_at, updated_at, clicked_as_prayed_over_count,
       has_been_changed, status, is_ai_generated, ai_generation_references
FROM prayers
ORDER BY created_at DESC, id DESC
"#;

pub const DELETE_PRAYER: &str = r#"
DELETE FROM prayers
WHERE id = ?1
"#;

/// Server-side increment so concurrent callers never lose an update.
pub const INCREMENT_PRAYED_OVER: &str = r#"
UPDATE prayers
SET clicked_as_prayed_over_count = clicked_as_prayed_over_count + 1, updated_at = ?2
WHERE id = ?1
"#;

pub const UPDATE_STATUS: &str = r#"
UPDATE prayers
SET status = ?2, updated_at = ?3
WHERE id = ?1
"#;

/// The flag latches: once set it survives edits back to the original text.
pub const UPDATE_TEXT: &str = r#"
UPDATE prayers
SET has_been_changed = CASE WHEN text = ?2 THEN has_been_changed ELSE 1 END,
    text = ?2,
    updated_at = ?3
WHERE id = ?1
"#;

// Counter queries (one pair per collection; the shapes are identical)
pub const SELECT_GENERATION_QUOTA: &str = r#"
SELECT count FROM generation_quota
WHERE owner_key = ?1 AND date = ?2
"#;

pub const INCREMENT_GENERATION_QUOTA: &str = r#"
INSERT INTO generation_quota (owner_key, date, count)
VALUES (?1, ?2, 1)
ON CONFLICT(owner_key, date) DO UPDATE SET count = count + 1
"#;

pub const SELECT_SIGNUP_THROTTLE: &str = r#"
SELECT count FROM signup_throttle
WHERE owner_key = ?1 AND date = ?2
"#;

pub const INCREMENT_SIGNUP_THROTTLE: &str = r#"
INSERT INTO signup_throttle (owner_key, date, count)
VALUES (?1, ?2, 1)
ON CONFLICT(owner_key, date) DO UPDATE SET count = count + 1
"#;
