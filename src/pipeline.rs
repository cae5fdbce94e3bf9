// 🔄 Data Pipeline - records → de-duplicated batch → one bulk insert
//
// States:  Ready → Running → Committing → Done
//                      └──────────┴──────→ Failed
//
// Either the whole batch reaches the gateway in one call, or nothing does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::builder::{Built, EntityBuilder};
use crate::entities::{Entity, EntityKey};
use crate::error::{IngestResult, Severity};
use crate::loader::Record;

// ============================================================================
// PERSISTENCE GATEWAY
// ============================================================================

/// Receives the finished batch. One call per run; commit-or-raise.
pub trait PersistenceGateway {
    /// Insert every entity, returning how many rows were written.
    fn insert(&mut self, entities: &[Entity]) -> IngestResult<usize>;
}

// ============================================================================
// PIPELINE STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Ready,
    Running,
    Committing,
    Done,
    Failed,
}

// ============================================================================
// BATCH ASSEMBLER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub records: usize,
    pub categories: usize,
    pub chains: usize,
    pub hotels: usize,
    /// Sub-entities that degraded to null
    pub skipped: usize,
    /// Categories/chains built without a name, never persisted
    pub unnamed: usize,
    /// Same (kind, id) seen again with different values; first one kept
    pub conflicts: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Output of a finished assembly pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub entities: Vec<Entity>,
    pub stats: BatchStats,
}

/// Builds entities per record and keeps the first entity for each (kind, id).
pub struct BatchAssembler<'a, B: EntityBuilder + ?Sized> {
    builder: &'a B,
    /// Key → index of the admitted entity in `entities`
    seen: HashMap<EntityKey, usize>,
    entities: Vec<Entity>,
    stats: BatchStats,
}

impl<'a, B: EntityBuilder + ?Sized> BatchAssembler<'a, B> {
    pub fn new(builder: &'a B) -> Self {
        BatchAssembler {
            builder,
            seen: HashMap::new(),
            entities: Vec::new(),
            stats: BatchStats::default(),
        }
    }

    /// Process one record. `Err` means the record was structurally broken
    /// and the whole batch must be abandoned.
    pub fn push_record(&mut self, record: &Record) -> IngestResult<()> {
        let category = self.builder.build_category(record)?;
        let chain = self.builder.build_chain(record)?;
        let hotel =
            self.builder
                .build_hotel(record, chain.entity.as_ref(), category.entity.as_ref())?;

        self.stats.records += 1;
        self.observe(&record.key, &category);
        self.observe(&record.key, &chain);
        self.observe(&record.key, &hotel);

        if let Some(category) = category.entity {
            if category.is_persistable() {
                self.admit(category.into());
            } else {
                self.stats.unnamed += 1;
            }
        }

        if let Some(chain) = chain.entity {
            if chain.is_persistable() {
                self.admit(chain.into());
            } else {
                self.stats.unnamed += 1;
            }
        }

        if let Some(hotel) = hotel.entity {
            self.admit(hotel.into());
        }

        Ok(())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    pub fn finish(self) -> Batch {
        Batch {
            entities: self.entities,
            stats: self.stats,
        }
    }

    fn observe<T>(&mut self, record_key: &str, built: &Built<T>) {
        if built.is_skipped() {
            self.stats.skipped += 1;
        }

        for diagnostic in &built.diagnostics {
            diagnostic.emit(record_key);
            match diagnostic.severity {
                Severity::Warning => self.stats.warnings += 1,
                Severity::Error => self.stats.errors += 1,
            }
        }
    }

    /// First write wins: a later entity with the same (kind, id) is dropped.
    fn admit(&mut self, entity: Entity) -> bool {
        let key = entity.key();

        if let Some(&index) = self.seen.get(&key) {
            if self.entities[index] != entity {
                self.stats.conflicts += 1;
                log::warn!(
                    "{} {} already queued with different values; keeping the first",
                    key.kind.as_str(),
                    key.id
                );
            }
            return false;
        }

        self.seen.insert(key, self.entities.len());
        match &entity {
            Entity::Category(_) => self.stats.categories += 1,
            Entity::Chain(_) => self.stats.chains += 1,
            Entity::Hotel(_) => self.stats.hotels += 1,
        }
        self.entities.push(entity);
        true
    }
}

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: BatchStats,
    pub inserted: usize,
}

impl RunSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} records → {} rows ({} categories, {} chains, {} hotels) | {} skipped, {} unnamed, {} conflicts | {} warnings, {} errors",
            self.stats.records,
            self.inserted,
            self.stats.categories,
            self.stats.chains,
            self.stats.hotels,
            self.stats.skipped,
            self.stats.unnamed,
            self.stats.conflicts,
            self.stats.warnings,
            self.stats.errors
        )
    }
}

// ============================================================================
// DATA PIPELINE
// ============================================================================

pub struct DataPipeline<B: EntityBuilder, G: PersistenceGateway> {
    builder: B,
    gateway: G,
    state: PipelineState,
}

impl<B: EntityBuilder, G: PersistenceGateway> DataPipeline<B, G> {
    pub fn new(builder: B, gateway: G) -> Self {
        DataPipeline {
            builder,
            gateway,
            state: PipelineState::Ready,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Assemble every record, then hand the batch to the gateway in one call.
    pub fn run(&mut self, records: &[Record]) -> IngestResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!("Run {} started with {} records", run_id, records.len());
        self.transition(PipelineState::Running);

        let batch = match Self::assemble(&self.builder, records) {
            Ok(batch) => batch,
            Err(e) => {
                self.transition(PipelineState::Failed);
                log::error!("Datapipeline has failed due to {}", e);
                return Err(e);
            }
        };

        self.transition(PipelineState::Committing);
        let inserted = match self.gateway.insert(&batch.entities) {
            Ok(inserted) => inserted,
            Err(e) => {
                self.transition(PipelineState::Failed);
                log::error!("Failed to insert data into database due to {}", e);
                return Err(e);
            }
        };
        self.transition(PipelineState::Done);

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            stats: batch.stats,
            inserted,
        };
        log::info!("Run {} done: {}", run_id, summary.summary());

        Ok(summary)
    }

    fn assemble(builder: &B, records: &[Record]) -> IngestResult<Batch> {
        let mut assembler = BatchAssembler::new(builder);
        for record in records {
            assembler.push_record(record)?;
        }
        Ok(assembler.finish())
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

// ============================================================================
// TESTS
// ============================================================================
