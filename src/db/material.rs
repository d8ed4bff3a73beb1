use rusqlite::Connection;

use super::{decimal_column, decimal_to_sql, normalize_decimal};
use crate::error::DbResult;
use crate::models::{CreateMaterialInput, Material, ProjectId};

pub fn insert_for_project(
    conn: &Connection,
    project_id: ProjectId,
    input: &CreateMaterialInput,
) -> DbResult<Material> {
    conn.execute(
        "INSERT INTO material (project_id, material_name, num_required, cost)
         VALUES (?, ?, ?, ?)",
        (
            project_id,
            &input.name,
            input.num_required,
            decimal_to_sql(input.cost),
        ),
    )?;

    Ok(Material {
        id: conn.last_insert_rowid(),
        project_id,
        name: input.name.clone(),
        num_required: input.num_required,
        cost: input.cost.map(normalize_decimal),
    })
}

pub fn delete_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<usize> {
    Ok(conn.execute("DELETE FROM material WHERE project_id = ?", [project_id])?)
}

pub fn fetch_all_for_project(conn: &Connection, project_id: ProjectId) -> DbResult<Vec<Material>> {
    let mut stmt = conn.prepare(
        "SELECT material_id, project_id, material_name, num_required, cost
         FROM material WHERE project_id = ? ORDER BY material_id",
    )?;

    let materials = stmt
        .query_map([project_id], |row| {
            Ok(Material {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                num_required: row.get(3)?,
                cost: decimal_column(row, 4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(materials)
}
