//! The project aggregate: the `project` row plus its materials, steps and
//! category links.
//!
//! Reads assemble the aggregate with one query per child table rather than a
//! single join, so N steps and M materials never multiply into N×M rows.

use rusqlite::{Connection, OptionalExtension};

use super::{category, decimal_column, decimal_to_sql, material, step};
use crate::error::{DbError, DbResult};
use crate::models::*;

type CascadeStep = (&'static str, fn(&Connection, ProjectId) -> DbResult<usize>);

/// Child deletes, in foreign-key dependency order. Run before the parent row goes.
const DELETE_CASCADE: &[CascadeStep] = &[
    ("project_category", category::delete_all_for_project),
    ("step", step::delete_all_for_project),
    ("material", material::delete_all_for_project),
];

/// Insert the project row and all of its children, then re-read the aggregate.
///
/// Categories are resolved by name and created when missing. A name listed
/// twice produces one association.
pub fn insert(conn: &Connection, input: &CreateProjectInput) -> DbResult<ProjectAggregate> {
    conn.execute(
        "INSERT INTO project (project_name, estimated_hours, actual_hours, difficulty, notes)
         VALUES (?, ?, ?, ?, ?)",
        (
            &input.name,
            decimal_to_sql(input.estimated_hours),
            decimal_to_sql(input.actual_hours),
            input.difficulty,
            &input.notes,
        ),
    )?;
    let id = conn.last_insert_rowid();

    for material_input in &input.materials {
        material::insert_for_project(conn, id, material_input)?;
    }
    for step_input in &input.steps {
        step::insert_for_project(conn, id, step_input)?;
    }
    link_categories(conn, id, &input.categories)?;

    tracing::debug!(
        "Inserted project {} with {} materials, {} steps",
        id,
        input.materials.len(),
        input.steps.len()
    );

    fetch_by_id(conn, id)
}

/// Identity and name of every project, ascending by identity.
pub fn fetch_all(conn: &Connection) -> DbResult<Vec<ProjectSummary>> {
    let mut stmt = conn.prepare("SELECT project_id, project_name FROM project ORDER BY project_id")?;

    let projects = stmt
        .query_map([], |row| {
            Ok(ProjectSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(projects)
}

pub fn fetch_by_id(conn: &Connection, id: ProjectId) -> DbResult<ProjectAggregate> {
    let project = conn
        .query_row(
            "SELECT project_id, project_name, estimated_hours, actual_hours, difficulty, notes
             FROM project WHERE project_id = ?",
            [id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    estimated_hours: decimal_column(row, 2)?,
                    actual_hours: decimal_column(row, 3)?,
                    difficulty: row.get(4)?,
                    notes: row.get(5)?,
                })
            },
        )
        .optional()?
        .ok_or(DbError::NotFound {
            entity: "project",
            id,
        })?;

    Ok(ProjectAggregate {
        materials: material::fetch_all_for_project(conn, id)?,
        steps: step::fetch_all_for_project(conn, id)?,
        categories: category::fetch_all_for_project(conn, id)?,
        project,
    })
}

/// Replace the scalar columns of a project, and its category links when
/// `input.categories` is set. Materials and steps are left alone.
///
/// Links are replaced before the scalar write, so a rejected scalar value
/// rolls back the new links with it.
pub fn update(conn: &Connection, id: ProjectId, input: &UpdateProjectInput) -> DbResult<()> {
    let exists = conn
        .query_row("SELECT 1 FROM project WHERE project_id = ?", [id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(DbError::NotFound {
            entity: "project",
            id,
        });
    }

    if let Some(names) = &input.categories {
        let unlinked = category::delete_all_for_project(conn, id)?;
        link_categories(conn, id, names)?;
        tracing::debug!("Replaced {} category links for project {}", unlinked, id);
    }

    conn.execute(
        "UPDATE project
         SET project_name = ?, estimated_hours = ?, actual_hours = ?, difficulty = ?, notes = ?
         WHERE project_id = ?",
        (
            &input.name,
            decimal_to_sql(input.estimated_hours),
            decimal_to_sql(input.actual_hours),
            input.difficulty,
            &input.notes,
            id,
        ),
    )?;
    Ok(())
}

/// Delete the project and everything it owns.
pub fn delete(conn: &Connection, id: ProjectId) -> DbResult<()> {
    for (table, delete_children) in DELETE_CASCADE {
        let removed = delete_children(conn, id)?;
        tracing::debug!("Cascade: removed {} {} rows for project {}", removed, table, id);
    }

    let rows = conn.execute("DELETE FROM project WHERE project_id = ?", [id])?;
    if rows == 0 {
        return Err(DbError::NotFound {
            entity: "project",
            id,
        });
    }
    Ok(())
}

/// Resolve each name, creating missing categories, and link it to the project.
fn link_categories(conn: &Connection, id: ProjectId, names: &[String]) -> DbResult<()> {
    for name in distinct_names(names) {
        let category = category::fetch_or_create_by_name(conn, name)?;
        category::insert_for_project(conn, id, &category)?;
    }
    Ok(())
}

fn distinct_names(names: &[String]) -> Vec<&str> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()) {
        if !name.is_empty() && !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::test_connection;

    fn deck_input() -> CreateProjectInput {
        CreateProjectInput {
            name: "Deck".to_string(),
            estimated_hours: Some(Decimal::new(1250, 2)),
            actual_hours: Some(Decimal::new(1425, 2)),
            difficulty: Some(4),
            notes: Some("outdoor".to_string()),
            materials: vec![CreateMaterialInput {
                name: "lumber".to_string(),
                num_required: Some(20),
                cost: Some(Decimal::new(4500, 2)),
            }],
            steps: ["measure", "cut", "assemble"]
                .iter()
                .enumerate()
                .map(|(i, text)| CreateStepInput {
                    step_order: i as i32 + 1,
                    step_text: text.to_string(),
                })
                .collect(),
            categories: vec!["outdoor".to_string(), "woodworking".to_string()],
        }
    }

    fn row_count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_insert_returns_assembled_aggregate() {
        let conn = test_connection();

        let aggregate = insert(&conn, &deck_input()).unwrap();

        assert_eq!(aggregate.project.name, "Deck");
        assert_eq!(aggregate.project.difficulty, Some(4));
        assert_eq!(aggregate.materials.len(), 1);
        assert_eq!(aggregate.steps.len(), 3);
        assert_eq!(aggregate.categories.len(), 2);
        assert!(aggregate.steps.iter().all(|s| s.project_id == aggregate.project.id));
    }

    #[test]
    fn test_fetch_by_id_does_not_multiply_rows() {
        let conn = test_connection();
        let mut input = deck_input();
        input.materials.push(CreateMaterialInput {
            name: "screws".to_string(),
            num_required: Some(200),
            cost: None,
        });

        let id = insert(&conn, &input).unwrap().project.id;
        let aggregate = fetch_by_id(&conn, id).unwrap();

        assert_eq!(aggregate.materials.len(), 2);
        assert_eq!(aggregate.steps.len(), 3);
        assert_eq!(aggregate.categories.len(), 2);
    }

    #[test]
    fn test_fetch_by_id_missing() {
        let conn = test_connection();
        let err = fetch_by_id(&conn, 1).unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "project", id: 1 }));
    }

    #[test]
    fn test_duplicate_category_names_link_once() {
        let conn = test_connection();
        let mut input = deck_input();
        input.categories = vec![
            "outdoor".to_string(),
            " outdoor ".to_string(),
            "".to_string(),
        ];

        let aggregate = insert(&conn, &input).unwrap();

        assert_eq!(aggregate.categories.len(), 1);
        assert_eq!(aggregate.categories[0].name, "outdoor");
    }

    #[test]
    fn test_update_replaces_scalars_only() {
        let conn = test_connection();
        let created = insert(&conn, &deck_input()).unwrap();

        update(
            &conn,
            created.project.id,
            &UpdateProjectInput {
                name: "Big Deck".to_string(),
                estimated_hours: None,
                actual_hours: Some(Decimal::new(30, 0)),
                difficulty: Some(5),
                notes: None,
                categories: None,
            },
        )
        .unwrap();

        let updated = fetch_by_id(&conn, created.project.id).unwrap();
        assert_eq!(updated.project.name, "Big Deck");
        assert!(updated.project.estimated_hours.is_none());
        assert_eq!(updated.project.actual_hours.unwrap().to_string(), "30.00");
        assert!(updated.project.notes.is_none());
        assert_eq!(updated.steps, created.steps);
        assert_eq!(updated.categories, created.categories);
    }

    #[test]
    fn test_update_replaces_category_links() {
        let conn = test_connection();
        let created = insert(&conn, &deck_input()).unwrap();
        let mut input = UpdateProjectInput::from(&created.project);
        input.categories = Some(vec!["woodworking".to_string(), "decking".to_string()]);

        update(&conn, created.project.id, &input).unwrap();

        let names: Vec<_> = fetch_by_id(&conn, created.project.id)
            .unwrap()
            .categories
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["woodworking", "decking"]);
        assert_eq!(row_count(&conn, "category"), 3);
        assert_eq!(row_count(&conn, "project_category"), 2);
    }

    #[test]
    fn test_update_with_empty_categories_unlinks_all() {
        let conn = test_connection();
        let created = insert(&conn, &deck_input()).unwrap();
        let mut input = UpdateProjectInput::from(&created.project);
        input.categories = Some(vec![]);

        update(&conn, created.project.id, &input).unwrap();

        assert!(fetch_by_id(&conn, created.project.id).unwrap().categories.is_empty());
        assert_eq!(row_count(&conn, "category"), 2);
    }

    #[test]
    fn test_update_missing() {
        let conn = test_connection();
        let input = UpdateProjectInput::from(&insert(&conn, &deck_input()).unwrap().project);

        let err = update(&conn, 999, &input).unwrap_err();
        assert!(matches!(err, DbError::NotFound { id: 999, .. }));
    }

    #[test]
    fn test_delete_cascades_but_keeps_categories() {
        let conn = test_connection();
        let id = insert(&conn, &deck_input()).unwrap().project.id;

        delete(&conn, id).unwrap();

        for table in ["project", "material", "step", "project_category"] {
            assert_eq!(row_count(&conn, table), 0, "{} should be empty", table);
        }
        assert_eq!(row_count(&conn, "category"), 2);
    }

    #[test]
    fn test_delete_missing() {
        let conn = test_connection();
        assert!(matches!(
            delete(&conn, 5).unwrap_err(),
            DbError::NotFound { id: 5, .. }
        ));
    }

    #[test]
    fn test_fetch_all_is_lightweight_and_ordered() {
        let conn = test_connection();
        let mut ids = Vec::new();
        for name in ["Zebra", "Alpha", "Middle"] {
            let mut input = deck_input();
            input.name = name.to_string();
            ids.push(insert(&conn, &input).unwrap().project.id);
        }

        let listed = fetch_all(&conn).unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), ids);
        assert_eq!(listed[0].name, "Zebra");
    }
}
