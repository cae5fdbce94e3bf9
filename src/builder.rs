// 🏗️ Entity Builder - one record → zero or one Category, Chain, Hotel
//
// Builders are total over field values: a bad id, missing name or unreadable
// location yields `Built::skipped` with a diagnostic, never an error.
// The only `Err` a builder returns is for a record that is not an object at
// all, which is a structural failure and aborts the batch.

use serde_json::{Map, Value};

use crate::coerce::{coerce_int, optional_text, type_name};
use crate::entities::{Category, Chain, EntityId, EntityKind, Hotel};
use crate::error::{Diagnostic, IngestError, IngestResult, Subject};
use crate::loader::Record;
use crate::location::LocationResolver;

// ============================================================================
// BUILD OUTCOME
// ============================================================================

/// An entity (or its absence) together with everything worth reporting
/// about how it was derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Built<T> {
    pub entity: Option<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Built<T> {
    pub fn entity(entity: T) -> Self {
        Built {
            entity: Some(entity),
            diagnostics: Vec::new(),
        }
    }

    pub fn skipped(diagnostic: Diagnostic) -> Self {
        Built {
            entity: None,
            diagnostics: vec![diagnostic],
        }
    }

    /// Attach a diagnostic that did not prevent (or did not cause) the outcome.
    pub fn noting(mut self, diagnostic: Option<Diagnostic>) -> Self {
        if let Some(d) = diagnostic {
            self.diagnostics.insert(0, d);
        }
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.entity.is_none()
    }
}

// ============================================================================
// BUILDER TRAIT
// ============================================================================

/// Per-record entity construction. The assembler only talks to this trait,
/// so tests can substitute builders that fail on purpose.
pub trait EntityBuilder {
    fn build_category(&self, record: &Record) -> IngestResult<Built<Category>>;

    fn build_chain(&self, record: &Record) -> IngestResult<Built<Chain>>;

    fn build_hotel(
        &self,
        record: &Record,
        chain: Option<&Chain>,
        category: Option<&Category>,
    ) -> IngestResult<Built<Hotel>>;
}

// ============================================================================
// DEFAULT BUILDER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    locations: LocationResolver,
}

impl RecordBuilder {
    pub fn new() -> Self {
        RecordBuilder {
            locations: LocationResolver::new(),
        }
    }

    fn fields(record: &Record) -> IngestResult<&Map<String, Value>> {
        record
            .value
            .as_object()
            .ok_or_else(|| IngestError::MalformedRecord {
                key: record.key.clone(),
                reason: format!("expected an object, found {}", type_name(&record.value)),
            })
    }

    /// Shared rule for `{ "id": .., "name": .. }` sub-objects.
    fn reference(
        value: Option<&Value>,
        kind: EntityKind,
    ) -> Result<(EntityId, Option<String>), Diagnostic> {
        let subject = Subject::Entity(kind);

        let fields = match value {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => {
                return Err(Diagnostic::warning(subject, format!("{} is missing", kind.as_str())))
            }
            Some(other) => {
                return Err(Diagnostic::warning(
                    subject,
                    format!("{} is a {}, expected an object", kind.as_str(), type_name(other)),
                ))
            }
        };

        let raw_id = coerce_int(fields.get("id"))
            .map_err(|e| Diagnostic::warning(subject, format!("id could not be read: {}", e)))?;
        let id = EntityId::new(raw_id)
            .map_err(|_| Diagnostic::warning(subject, "id smaller than 0"))?;

        Ok((id, optional_text(fields.get("name"))))
    }
}

impl EntityBuilder for RecordBuilder {
    fn build_category(&self, record: &Record) -> IngestResult<Built<Category>> {
        let fields = Self::fields(record)?;

        Ok(match Self::reference(fields.get("category"), EntityKind::Category) {
            Ok((id, name)) => Built::entity(Category::new(id, name)),
            Err(diagnostic) => Built::skipped(diagnostic),
        })
    }

    fn build_chain(&self, record: &Record) -> IngestResult<Built<Chain>> {
        let fields = Self::fields(record)?;

        Ok(match Self::reference(fields.get("chain"), EntityKind::Chain) {
            Ok((id, name)) => Built::entity(Chain::new(id, name)),
            Err(diagnostic) => Built::skipped(diagnostic),
        })
    }

    fn build_hotel(
        &self,
        record: &Record,
        chain: Option<&Chain>,
        category: Option<&Category>,
    ) -> IngestResult<Built<Hotel>> {
        let fields = Self::fields(record)?;
        let subject = Subject::Entity(EntityKind::Hotel);

        let (location, location_note) = match self.locations.resolve(fields.get("location")) {
            Ok(location) => (location, None),
            Err(diagnostic) => (None, Some(diagnostic)),
        };

        let raw_id = match coerce_int(fields.get("property_id")) {
            Ok(id) => id,
            Err(e) => {
                let diagnostic =
                    Diagnostic::error(subject, format!("property_id could not be read: {}", e));
                return Ok(Built::skipped(diagnostic).noting(location_note));
            }
        };
        let name = optional_text(fields.get("name"));

        // Coercion can still yield a negative id (e.g. "-5"); this check is load-bearing
        let built = match (EntityId::new(raw_id), name) {
            (Ok(id), Some(name)) => Built::entity(Hotel::new(id, name, category, chain, location)),
            _ => Built::skipped(Diagnostic::warning(
                subject,
                "id smaller than 0 or name is invalid",
            )),
        };

        Ok(built.noting(location_note))
    }
}
