// 🏷️ Category Entity - hotel classification ("Hotel", "Hostel", ...)

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Category row. A category without a name is built but never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: EntityId,
    pub category_name: Option<String>,
}

impl Category {
    pub fn new(category_id: EntityId, category_name: Option<String>) -> Self {
        Category {
            category_id,
            category_name,
        }
    }

    /// Whether this category may be written to the `category` table.
    pub fn is_persistable(&self) -> bool {
        self.category_name.is_some()
    }
}
