use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, CreateMaterialInput, CreateStepInput, Material, ProjectId, Step};

/// The scalar columns of a project row.
///
/// Hours are fixed-point with two digits of scale. `difficulty` is 1 through 5
/// when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
}

/// Identity and name only, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
}

/// A project with its owned children and associated categories.
///
/// Steps are in ascending `step_order`. Materials and categories are in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAggregate {
    #[serde(flatten)]
    pub project: Project,
    pub materials: Vec<Material>,
    pub steps: Vec<Step>,
    pub categories: Vec<Category>,
}

/// Input for creating a project together with its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub materials: Vec<CreateMaterialInput>,
    #[serde(default)]
    pub steps: Vec<CreateStepInput>,
    /// Category names. Missing categories are created on the fly.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Input for replacing a project's scalar fields and, optionally, its
/// category links.
///
/// Scalars are a full replace: a `None` clears the column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: String,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
    /// When set, replaces every category link with these names. `Some(vec![])`
    /// unlinks all categories; `None` leaves the links as they are.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl From<&Project> for UpdateProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            estimated_hours: project.estimated_hours,
            actual_hours: project.actual_hours,
            difficulty: project.difficulty,
            notes: project.notes.clone(),
            categories: None,
        }
    }
}

struct Nullable<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Nullable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

impl fmt::Display for ProjectAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.project;
        writeln!(f, "   ID={}", p.id)?;
        writeln!(f, "   Name={}", p.name)?;
        writeln!(f, "   EstimatedHours={}", Nullable(&p.estimated_hours))?;
        writeln!(f, "   ActualHours={}", Nullable(&p.actual_hours))?;
        writeln!(f, "   Difficulty={}", Nullable(&p.difficulty))?;
        writeln!(f, "   Notes={}", Nullable(&p.notes))?;

        writeln!(f, "   Materials:")?;
        for material in &self.materials {
            writeln!(
                f,
                "      ID={}, name={}, numRequired={}, cost={}",
                material.id,
                material.name,
                Nullable(&material.num_required),
                Nullable(&material.cost)
            )?;
        }

        writeln!(f, "   Steps:")?;
        for step in &self.steps {
            writeln!(f, "      {}. {}", step.step_order, step.step_text)?;
        }

        write!(f, "   Categories:")?;
        for category in &self.categories {
            write!(f, "\n      ID={}, name={}", category.id, category.name)?;
        }
        Ok(())
    }
}
