//! Categories and the `project_category` association.
//!
//! Category rows are shared between projects. Nothing in this module removes
//! a category as a side effect of touching a project.

use rusqlite::{Connection, Row};

use crate::error::{DbError, DbResult};
use crate::models::{Category, ProjectId};

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Resolve a category by name, creating it when it does not exist yet.
pub fn fetch_or_create_by_name(conn: &Connection, name: &str) -> DbResult<Category> {
    let created = conn.execute(
        "INSERT INTO category (category_name) VALUES (?)
         ON CONFLICT (category_name) DO NOTHING",
        [name],
    )?;
    if created > 0 {
        tracing::debug!("Created category '{}'", name);
    }

    Ok(conn.query_row(
        "SELECT category_id, category_name FROM category WHERE category_name = ?",
        [name],
        category_from_row,
    )?)
}

/// Link an existing category to a project.
pub fn insert_for_project(
    conn: &Connection,
    project_id: ProjectId,
    category: &Category,
) -> DbResult<()> {
    conn.execute(
        "INSERT INTO project_category (project_id, category_id) VALUES (?, ?)",
        (project_id, category.id),
    )?;
    Ok(())
}

/// Remove every association row for the project. Category rows stay.
pub fn delete_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<usize> {
    Ok(conn.execute(
        "DELETE FROM project_category WHERE project_id = ?",
        [project_id],
    )?)
}

/// Categories linked to the project, in the order they were linked.
pub fn fetch_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.category_id, c.category_name
         FROM project_category pc
         JOIN category c USING (category_id)
         WHERE pc.project_id = ?
         ORDER BY pc.rowid",
    )?;

    let categories = stmt
        .query_map([project_id], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

pub fn fetch_all(conn: &Connection) -> DbResult<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT category_id, category_name FROM category ORDER BY category_id")?;

    let categories = stmt
        .query_map([], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

/// Delete a category and its association rows. Linked projects are untouched.
pub fn delete(conn: &Connection, category_id: i64) -> DbResult<()> {
    let unlinked = conn.execute(
        "DELETE FROM project_category WHERE category_id = ?",
        [category_id],
    )?;
    let rows = conn.execute("DELETE FROM category WHERE category_id = ?", [category_id])?;
    if rows == 0 {
        return Err(DbError::NotFound {
            entity: "category",
            id: category_id,
        });
    }

    tracing::debug!(
        "Deleted category {} and {} association rows",
        category_id,
        unlinked
    );
    Ok(())
}
