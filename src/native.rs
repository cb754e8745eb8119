use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Source of live database connections, e.g. a test database or a file path
pub trait ConnectionProvider {
    /// Open a live connection to the backing database
    fn connection(&self) -> Result<Connection>;
}

impl ConnectionProvider for Path {
    fn connection(&self) -> Result<Connection> {
        Connection::open(self)
            .with_context(|| format!("failed to open database at {}", self.display()))
    }
}

impl ConnectionProvider for PathBuf {
    fn connection(&self) -> Result<Connection> {
        self.as_path().connection()
    }
}

/// Raw statement handle handed to the consumer of [`update_natively`]
pub struct NativeStatement<'conn> {
    conn: &'conn Connection,
}

impl NativeStatement<'_> {
    /// Execute a single SQL statement, returning the number of affected rows
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .with_context(|| format!("failed to execute: {sql}"))
    }

    /// Execute a script of semicolon-separated SQL statements
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .context("failed to execute statement batch")
    }
}

/// Update the database directly with raw SQL, bypassing the application's
/// persistence layer.
///
/// Acquires one connection from the provider, hands a statement handle to
/// `consumer` exactly once, then releases the handle and closes the
/// connection on every exit path, including when the consumer errors. If both
/// the consumer and the close fail, the consumer's error propagates.
///
/// Mutating the store natively can desynchronize a live persistence session's
/// cache, so keep it to before/after bracketing: mutate, run the test body,
/// then mutate again to restore state.
///
/// ```no_run
/// use stocktake::{update_natively, TestDatabase};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = TestDatabase::new()?;
/// update_natively(&db, |stmt| {
///     stmt.execute("DELETE FROM widgets")?;
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn update_natively<P, F>(provider: &P, consumer: F) -> Result<()>
where
    P: ConnectionProvider + ?Sized,
    F: FnOnce(&NativeStatement<'_>) -> Result<()>,
{
    let conn = provider.connection().context("failed to acquire connection")?;
    let stmt = NativeStatement { conn: &conn };

    let outcome = consumer(&stmt);

    drop(stmt);
    let closed = conn.close().map_err(|(_, err)| err);

    outcome?;
    closed.context("failed to close connection")?;
    Ok(())
}
