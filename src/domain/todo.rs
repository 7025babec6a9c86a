use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single synchronized todo entry.
///
/// Equality covers every field: the store locates items by value, so two
/// entries that differ only in `id` are distinct, while two entries with the
/// same `id` but different completion state are not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Todo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id: new_id(), name: name.into(), description: description.into(), is_completed: false }
    }

    /// Copy of this item with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self { is_completed: !self.is_completed, ..self.clone() }
    }
}

fn new_id() -> String { Uuid::new_v4().to_string() }
