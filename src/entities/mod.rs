// Entity Models - the three persisted kinds
//
// Each entity is an immutable value built once per input record.
// Identity for de-duplication is (kind, id); see `EntityKey`.

pub mod category;
pub mod chain;
pub mod hotel;

pub use category::Category;
pub use chain::Chain;
pub use hotel::Hotel;

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ENTITY ID
// ============================================================================

/// Non-negative primary key. Construction is the `id >= 0` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeId(pub i64);

impl EntityId {
    pub fn new(value: i64) -> Result<Self, NegativeId> {
        if value >= 0 {
            Ok(EntityId(value))
        } else {
            Err(NegativeId(value))
        }
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for EntityId {
    type Error = NegativeId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ENTITY KIND & KEY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Category,
    Chain,
    Hotel,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Chain => "chain",
            EntityKind::Hotel => "hotel",
        }
    }
}

/// De-duplication key: first entity seen for a key wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

// ============================================================================
// ENTITY
// ============================================================================

/// One row headed for the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Category(Category),
    Chain(Chain),
    Hotel(Hotel),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Category(_) => EntityKind::Category,
            Entity::Chain(_) => EntityKind::Chain,
            Entity::Hotel(_) => EntityKind::Hotel,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Entity::Category(c) => c.category_id,
            Entity::Chain(c) => c.chain_id,
            Entity::Hotel(h) => h.hotel_id,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind(),
            id: self.id(),
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match self {
            Entity::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&Chain> {
        match self {
            Entity::Chain(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_hotel(&self) -> Option<&Hotel> {
        match self {
            Entity::Hotel(h) => Some(h),
            _ => None,
        }
    }
}

impl From<Category> for Entity {
    fn from(category: Category) -> Self {
        Entity::Category(category)
    }
}

impl From<Chain> for Entity {
    fn from(chain: Chain) -> Self {
        Entity::Chain(chain)
    }
}

impl From<Hotel> for Entity {
    fn from(hotel: Hotel) -> Self {
        Entity::Hotel(hotel)
    }
}
