use serde::{Deserialize, Serialize};

use super::ProjectId;

/// One instruction in a project's build sequence.
///
/// `step_order` defines the sequence and is unique within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub project_id: ProjectId,
    pub step_order: i32,
    pub step_text: String,
}

/// Input for adding a step to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStepInput {
    pub step_order: i32,
    pub step_text: String,
}
