use rusqlite::Connection;

use crate::error::DbResult;

const SCHEMA: &str = include_str!("schema.sql");

pub const TABLES: &[&str] = &["project", "material", "step", "category", "project_category"];

/// Create every table and index that does not exist yet.
pub fn apply_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA)?;
    tracing::debug!("Schema applied ({} tables)", TABLES.len());
    Ok(())
}
