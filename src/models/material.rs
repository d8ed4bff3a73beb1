use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProjectId;

/// Something that must be bought or gathered for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub project_id: ProjectId,
    pub name: String,
    pub num_required: Option<i32>,
    /// Unit cost, scale 2.
    pub cost: Option<Decimal>,
}

/// Input for adding a material to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaterialInput {
    pub name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Decimal>,
}
