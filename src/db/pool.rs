//! SQLite connection wrapper (one connection per request / CLI invocation).

use rusqlite::{Connection, Result, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open the database with foreign keys on and a busy timeout, so that
    /// concurrent writers wait for the lock instead of failing with SQLITE_BUSY.
    pub fn with_busy_timeout(path: &str, busy_ms: u64) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        conn.busy_timeout(Duration::from_millis(busy_ms))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Begin a write transaction that takes the database write lock immediately.
    ///
    /// Everything read inside it stays valid until commit: no other writer can
    /// interleave between a check and the write that depends on it.
    /// Dropping the transaction without `commit()` rolls it back.
    pub fn immediate(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
    }
}
