use serde::{Deserialize, Serialize};

/// A tag shared across projects. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
