//! Database schema definitions
//!
//! All SQL schema for the harvest database lives here.

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Canonical company registry, keyed by exchange code
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_code TEXT NOT NULL UNIQUE,
    company_name TEXT NOT NULL,
    ticker_symbol TEXT,
    market TEXT NOT NULL,
    shariah_board TEXT NOT NULL,
    sector TEXT,
    subsector TEXT,
    classification TEXT NOT NULL,
    purification_amount REAL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_companies_market ON companies(market);
CREATE INDEX IF NOT EXISTS idx_companies_board ON companies(shariah_board);
CREATE INDEX IF NOT EXISTS idx_companies_active ON companies(is_active);

-- Per-company audit trail of listing changes
CREATE TABLE IF NOT EXISTS company_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_code TEXT NOT NULL,
    change_type TEXT NOT NULL,
    details TEXT,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_code ON company_history(company_code);

-- One row per completed harvest run
CREATE TABLE IF NOT EXISTS harvest_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_at TEXT NOT NULL,
    total_companies INTEGER NOT NULL,
    new_companies INTEGER NOT NULL,
    updated_companies INTEGER NOT NULL,
    delisted_companies INTEGER NOT NULL,
    duration_seconds INTEGER NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    config_hash TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on every open; all statements are idempotent.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
