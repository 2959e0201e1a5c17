//! SQLite schema definition.

/// Complete database schema for the diary.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id INTEGER NOT NULL UNIQUE,          -- chat account ID
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    notification_time TEXT,                       -- HH:MM
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Entries (one per user per calendar day)
-- ============================================================================

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    entry_date TEXT NOT NULL,                     -- YYYY-MM-DD
    pain_level TEXT CHECK (
        pain_level IN ('none', 'mild', 'moderate', 'severe', 'very_severe')
    ),
    pain_score INTEGER CHECK (pain_score BETWEEN 1 AND 10),
    pain_description TEXT,
    notes TEXT,
    had_attack INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, entry_date)
);

CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, entry_date DESC);

-- ============================================================================
-- Medications and symptoms (append-only children of an entry)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    medication_type TEXT NOT NULL CHECK (
        medication_type IN ('preventive', 'abortive', 'other')
    ),
    dosage TEXT,
    taken_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_medications_entry ON medications(entry_id);

CREATE TABLE IF NOT EXISTS symptoms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    severity INTEGER CHECK (severity BETWEEN 1 AND 10)
);

CREATE INDEX IF NOT EXISTS idx_symptoms_entry ON symptoms(entry_id);
"#;
