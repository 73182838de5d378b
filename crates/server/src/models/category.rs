//! Catalog category entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::CategoryId;

/// A catalog category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for categories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Category {
    /// Build a category from a creation payload.
    #[must_use]
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::generate(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply_update(&mut self, input: CategoryInput) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        self.updated_at = Utc::now();
    }
}
