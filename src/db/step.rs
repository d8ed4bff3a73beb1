use rusqlite::Connection;

use crate::error::DbResult;
use crate::models::{CreateStepInput, ProjectId, Step};

pub fn insert_for_project(
    conn: &Connection,
    project_id: ProjectId,
    input: &CreateStepInput,
) -> DbResult<Step> {
    conn.execute(
        "INSERT INTO step (project_id, step_order, step_text) VALUES (?, ?, ?)",
        (project_id, input.step_order, &input.step_text),
    )?;

    Ok(Step {
        id: conn.last_insert_rowid(),
        project_id,
        step_order: input.step_order,
        step_text: input.step_text.clone(),
    })
}

pub fn delete_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<usize> {
    Ok(conn.execute("DELETE FROM step WHERE project_id = ?", [project_id])?)
}

/// Steps in ascending `step_order`.
pub fn fetch_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<Vec<Step>> {
    let mut stmt = conn.prepare(
        "SELECT step_id, project_id, step_order, step_text
         FROM step WHERE project_id = ? ORDER BY step_order",
    )?;

    let steps = stmt
        .query_map([project_id], |row| {
            Ok(Step {
                id: row.get(0)?,
                project_id: row.get(1)?,
                step_order: row.get(2)?,
                step_text: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(steps)
}
