use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::native::{ConnectionProvider, update_natively};

/// A throwaway file-backed SQLite database for tests.
///
/// File-backed rather than in-memory so every connection opened through the
/// provider observes the same committed state. The file lives in a temporary
/// directory that is removed when the value is dropped.
pub struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    /// Create an empty database in a fresh temporary directory
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to create temporary directory")?;
        let path = dir.path().join("test.db");
        Connection::open(&path)
            .with_context(|| format!("failed to create database at {}", path.display()))?;
        Ok(Self { _dir: dir, path })
    }

    /// Create a database and apply a schema script to it
    pub fn with_schema(sql: &str) -> Result<Self> {
        let db = Self::new()?;
        update_natively(&db, |stmt| stmt.execute_batch(sql))?;
        Ok(db)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for TestDatabase {
    fn connection(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("failed to open database at {}", self.path.display()))
    }
}
