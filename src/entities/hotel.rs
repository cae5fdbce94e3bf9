// 🏨 Hotel Entity - one property, optionally linked to a category and chain

use serde::{Deserialize, Serialize};

use super::{Category, Chain, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: EntityId,
    pub hotel_name: String,
    /// Nullable foreign key into `category`
    pub category_id: Option<EntityId>,
    /// Nullable foreign key into `chain`
    pub chain_id: Option<EntityId>,
    /// "lat,long"
    pub location: Option<String>,
}

impl Hotel {
    pub fn new(
        hotel_id: EntityId,
        hotel_name: String,
        category: Option<&Category>,
        chain: Option<&Chain>,
        location: Option<String>,
    ) -> Self {
        Hotel {
            hotel_id,
            hotel_name,
            category_id: category.map(|c| c.category_id),
            chain_id: chain.map(|c| c.chain_id),
            location,
        }
    }
}
