//! Relational persistence for the project aggregate.
//!
//! [`Database`] is the connection scope: every unit of work gets its own
//! connection and its own transaction. The store modules ([`project`],
//! [`material`], [`step`], [`category`]) never open connections themselves;
//! they run on whatever connection the scope hands them.

pub mod category;
pub mod material;
pub mod project;
mod schema;
pub mod step;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

use crate::error::DbResult;

pub use schema::TABLES;

static MEMORY_DB_SEQ: AtomicUsize = AtomicUsize::new(0);

enum Location {
    File(PathBuf),
    /// Shared-cache in-memory database. SQLite drops it once the last
    /// connection closes, so one idle connection is held for the handle's lifetime.
    Memory {
        uri: String,
        _keepalive: Mutex<Connection>,
    },
}

#[derive(Clone)]
pub struct Database {
    location: Arc<Location>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        release(conn);
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            location: Arc::new(Location::File(path)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let uri = format!(
            "file:project-ledger-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let keepalive = Connection::open(&uri)?;
        Ok(Self {
            location: Arc::new(Location::Memory {
                uri,
                _keepalive: Mutex::new(keepalive),
            }),
        })
    }

    /// Create any missing tables.
    pub fn initialize(&self) -> DbResult<()> {
        self.with_transaction(schema::apply_schema)
    }

    /// Run `work` inside one transaction on a fresh connection.
    ///
    /// Commits when `work` returns `Ok`, otherwise rolls back and hands the
    /// original error back. The connection is closed on every path; a failed
    /// rollback or close is logged and never replaces the error from `work`.
    pub fn with_transaction<T, F>(&self, work: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let mut conn = self.connect()?;
        let outcome = run_in_transaction(&mut conn, work);
        release(conn);
        outcome
    }

    fn connect(&self) -> DbResult<Connection> {
        let conn = match &*self.location {
            Location::File(path) => Connection::open(path)?,
            Location::Memory { uri, .. } => Connection::open(uri)?,
        };
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }
}

/// Platform data directory, e.g. `~/.local/share/project-ledger/projects.db`.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "project-ledger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("projects.db"))
}

fn run_in_transaction<T, F>(conn: &mut Connection, work: F) -> DbResult<T>
where
    F: FnOnce(&Connection) -> DbResult<T>,
{
    let tx = conn.transaction()?;
    match work(&*tx) {
        Ok(value) => {
            tx.commit()?;
            tracing::debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn release(conn: Connection) {
    if let Err((_, err)) = conn.close() {
        tracing::warn!(error = %err, "Failed to close database connection");
    }
}

/// Round to two digits and pin the scale, so `12.5` is stored as `12.50`.
pub fn normalize_decimal(value: Decimal) -> Decimal {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value
}

fn decimal_to_sql(value: Option<Decimal>) -> Option<String> {
    value.map(|v| normalize_decimal(v).to_string())
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| {
            Decimal::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    schema::apply_schema(&conn).unwrap();
    conn
}
