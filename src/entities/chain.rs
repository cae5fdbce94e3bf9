// 🔗 Chain Entity - hotel brand/chain ("Independent", ...)

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Chain row. Mirrors `Category`: a nameless chain is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub chain_id: EntityId,
    pub chain_name: Option<String>,
}

impl Chain {
    pub fn new(chain_id: EntityId, chain_name: Option<String>) -> Self {
        Chain {
            chain_id,
            chain_name,
        }
    }

    pub fn is_persistable(&self) -> bool {
        self.chain_name.is_some()
    }
}
