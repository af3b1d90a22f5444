//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::model::{CompanyRecord, RunStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StoreError, StoreResult};
use crate::storage::{ChangeType, RunLog, StoreStatistics, StoredCompany};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_run_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<(RunLog, String)> {
        let run_at_str: String = row.get(0)?;
        let status_str: String = row.get(6)?;
        let log = RunLog {
            run_at: Utc::now(), // replaced by the caller after parsing
            total_companies: row.get(1)?,
            new_companies: row.get(2)?,
            updated_companies: row.get(3)?,
            delisted_companies: row.get(4)?,
            duration_seconds: row.get(5)?,
            status: RunStatus::from_db_string(&status_str).unwrap_or(RunStatus::Failed),
            error_message: row.get(7)?,
            config_hash: row.get(8)?,
        };
        Ok((log, run_at_str))
    }
}

impl Store for SqliteStore {
    // ===== Companies =====

    fn load_active_companies(&self) -> StoreResult<HashMap<String, StoredCompany>> {
        let mut stmt = self.conn.prepare(
            "SELECT company_code, company_name, market, shariah_board, sector
             FROM companies WHERE is_active = 1",
        )?;

        let mut companies = HashMap::new();
        let rows = stmt.query_map([], |row| {
            let code: String = row.get(0)?;
            let stored = StoredCompany {
                company_name: row.get(1)?,
                market: row.get(2)?,
                shariah_board: row.get(3)?,
                sector: row.get(4)?,
            };
            Ok((code, stored))
        })?;

        for row in rows {
            let (code, stored) = row?;
            companies.insert(code, stored);
        }

        Ok(companies)
    }

    fn upsert_company(&mut self, record: &CompanyRecord) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO companies
             (company_code, company_name, ticker_symbol, market, shariah_board,
              sector, subsector, classification, purification_amount,
              is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)
             ON CONFLICT(company_code) DO UPDATE SET
                company_name = excluded.company_name,
                ticker_symbol = excluded.ticker_symbol,
                market = excluded.market,
                shariah_board = excluded.shariah_board,
                sector = excluded.sector,
                subsector = excluded.subsector,
                classification = excluded.classification,
                purification_amount = excluded.purification_amount,
                is_active = 1,
                updated_at = excluded.updated_at",
            params![
                record.company_code,
                record.company_name,
                record.ticker_symbol,
                record.market.label(),
                record.shariah_board,
                record.sector,
                record.subsector,
                record.classification,
                record.purification_amount,
                now,
            ],
        )?;
        Ok(())
    }

    fn mark_delisted(&mut self, company_code: &str) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE companies SET is_active = 0, updated_at = ?1 WHERE company_code = ?2",
            params![now, company_code],
        )?;
        Ok(())
    }

    // ===== History =====

    fn record_history(
        &mut self,
        company_code: &str,
        change: ChangeType,
        details: Option<&str>,
    ) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO company_history (company_code, change_type, details, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![company_code, change.to_db_string(), details, now],
        )?;
        Ok(())
    }

    // ===== Runs =====

    fn log_run(&mut self, run: &RunLog) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO harvest_runs
             (run_at, total_companies, new_companies, updated_companies,
              delisted_companies, duration_seconds, status, error_message, config_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                run.run_at.to_rfc3339(),
                run.total_companies,
                run.new_companies,
                run.updated_companies,
                run.delisted_companies,
                run.duration_seconds,
                run.status.to_db_string(),
                run.error_message,
                run.config_hash,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn last_run(&self) -> StoreResult<Option<RunLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_at, total_companies, new_companies, updated_companies,
                    delisted_companies, duration_seconds, status, error_message, config_hash
             FROM harvest_runs ORDER BY id DESC LIMIT 1",
        )?;

        let row = stmt.query_row([], Self::row_to_run_log).optional()?;
        match row {
            None => Ok(None),
            Some((mut log, run_at_str)) => {
                log.run_at = run_at_str
                    .parse::<DateTime<Utc>>()
                    .map_err(|e| StoreError::CorruptRow(format!("run_at: {e}")))?;
                Ok(Some(log))
            }
        }
    }

    // ===== Statistics =====

    fn statistics(&self) -> StoreResult<StoreStatistics> {
        let mut stats = StoreStatistics::default();

        stats.active_companies = self.conn.query_row(
            "SELECT COUNT(*) FROM companies WHERE is_active = 1",
            [],
            |row| row.get::<_, i64>(0),
        )? as u64;

        stats.delisted_companies = self.conn.query_row(
            "SELECT COUNT(*) FROM companies WHERE is_active = 0",
            [],
            |row| row.get::<_, i64>(0),
        )? as u64;

        stats.total_runs =
            self.conn
                .query_row("SELECT COUNT(*) FROM harvest_runs", [], |row| {
                    row.get::<_, i64>(0)
                })? as u64;

        let mut stmt = self.conn.prepare(
            "SELECT market, COUNT(*) FROM companies WHERE is_active = 1 GROUP BY market",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (market, count) = row?;
            stats.by_market.insert(market, count as u64);
        }

        let mut stmt = self.conn.prepare(
            "SELECT shariah_board, COUNT(*) FROM companies WHERE is_active = 1 GROUP BY shariah_board",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (board, count) = row?;
            stats.by_shariah_board.insert(board, count as u64);
        }

        Ok(stats)
    }
}
