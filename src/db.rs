// 🗄️ Persistence - SQLite schema + bulk insert gateway
//
// Three tables in one database file. The whole batch goes in through a single
// transaction: commit on success, rollback (by drop) on the first failure.

use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::{Category, Chain, Entity, EntityId, Hotel};
use crate::error::IngestResult;
use crate::pipeline::PersistenceGateway;

/// Open (or create) the database file and prepare it for a run.
pub fn open_database(path: &Path, enforce_foreign_keys: bool) -> IngestResult<Connection> {
    let conn = Connection::open(path)?;

    // WAL mode for crash recovery
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    log::debug!("journal_mode = {}", mode);

    configure(&conn, enforce_foreign_keys)?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn configure(conn: &Connection, enforce_foreign_keys: bool) -> IngestResult<()> {
    conn.pragma_update(None, "foreign_keys", enforce_foreign_keys)?;
    Ok(())
}

pub fn setup_database(conn: &Connection) -> IngestResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            category_id INTEGER PRIMARY KEY,
            category_name TEXT
        );

        CREATE TABLE IF NOT EXISTS chain (
            chain_id INTEGER PRIMARY KEY,
            chain_name TEXT
        );

        CREATE TABLE IF NOT EXISTS hotel (
            hotel_id INTEGER PRIMARY KEY,
            hotel_name TEXT,
            category_id INTEGER REFERENCES category(category_id),
            chain_id INTEGER REFERENCES chain(chain_id),
            location TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_hotel_category ON hotel(category_id);
        CREATE INDEX IF NOT EXISTS idx_hotel_chain ON hotel(chain_id);",
    )?;

    Ok(())
}

/// Insert every entity inside one transaction. Plain INSERT: an id that is
/// already in the table fails the whole batch.
///
/// Rows are written parents first (categories, chains, then hotels), keeping
/// batch order within each table, so foreign keys hold at every statement.
pub fn insert_entities(conn: &mut Connection, entities: &[Entity]) -> IngestResult<usize> {
    let tx = conn.transaction()?;
    let inserted = insert_categories(&tx, entities)?
        + insert_chains(&tx, entities)?
        + insert_hotels(&tx, entities)?;
    tx.commit()?;

    log::info!("Inserted {} rows", inserted);
    Ok(inserted)
}

fn insert_categories(tx: &Transaction<'_>, entities: &[Entity]) -> IngestResult<usize> {
    let mut stmt =
        tx.prepare_cached("INSERT INTO category (category_id, category_name) VALUES (?1, ?2)")?;
    let mut inserted = 0;

    for category in entities.iter().filter_map(Entity::as_category) {
        inserted += stmt.execute(params![category.category_id.get(), category.category_name])?;
    }

    Ok(inserted)
}

fn insert_chains(tx: &Transaction<'_>, entities: &[Entity]) -> IngestResult<usize> {
    let mut stmt = tx.prepare_cached("INSERT INTO chain (chain_id, chain_name) VALUES (?1, ?2)")?;
    let mut inserted = 0;

    for chain in entities.iter().filter_map(Entity::as_chain) {
        inserted += stmt.execute(params![chain.chain_id.get(), chain.chain_name])?;
    }

    Ok(inserted)
}

fn insert_hotels(tx: &Transaction<'_>, entities: &[Entity]) -> IngestResult<usize> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO hotel (hotel_id, hotel_name, category_id, chain_id, location)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let mut inserted = 0;

    for hotel in entities.iter().filter_map(Entity::as_hotel) {
        inserted += stmt.execute(params![
            hotel.hotel_id.get(),
            hotel.hotel_name,
            hotel.category_id.map(EntityId::get),
            hotel.chain_id.map(EntityId::get),
            hotel.location,
        ])?;
    }

    Ok(inserted)
}

// ============================================================================
// GATEWAY
// ============================================================================

pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn new(conn: Connection) -> Self {
        SqliteGateway { conn }
    }

    pub fn open(path: &Path, enforce_foreign_keys: bool) -> IngestResult<Self> {
        Ok(SqliteGateway::new(open_database(path, enforce_foreign_keys)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl PersistenceGateway for SqliteGateway {
    fn insert(&mut self, entities: &[Entity]) -> IngestResult<usize> {
        insert_entities(&mut self.conn, entities)
    }
}

// ============================================================================
// READ-BACK
// ============================================================================

fn entity_id(raw: i64) -> rusqlite::Result<EntityId> {
    EntityId::new(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, raw))
}

fn optional_id(raw: Option<i64>) -> rusqlite::Result<Option<EntityId>> {
    raw.map(entity_id).transpose()
}

pub fn get_all_categories(conn: &Connection) -> IngestResult<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT category_id, category_name FROM category ORDER BY category_id")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category::new(entity_id(row.get(0)?)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

pub fn get_all_chains(conn: &Connection) -> IngestResult<Vec<Chain>> {
    let mut stmt = conn.prepare("SELECT chain_id, chain_name FROM chain ORDER BY chain_id")?;

    let chains = stmt
        .query_map([], |row| Ok(Chain::new(entity_id(row.get(0)?)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(chains)
}

pub fn get_all_hotels(conn: &Connection) -> IngestResult<Vec<Hotel>> {
    let mut stmt = conn.prepare(
        "SELECT hotel_id, hotel_name, category_id, chain_id, location
         FROM hotel
         ORDER BY hotel_id",
    )?;

    let hotels = stmt
        .query_map([], |row| {
            Ok(Hotel {
                hotel_id: entity_id(row.get(0)?)?,
                hotel_name: row.get(1)?,
                category_id: optional_id(row.get(2)?)?,
                chain_id: optional_id(row.get(3)?)?,
                location: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(hotels)
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub categories: i64,
    pub chains: i64,
    pub hotels: i64,
}

impl TableCounts {
    pub fn total(&self) -> i64 {
        self.categories + self.chains + self.hotels
    }
}

pub fn verify_counts(conn: &Connection) -> IngestResult<TableCounts> {
    let count = |table: &str| -> rusqlite::Result<i64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    };

    Ok(TableCounts {
        categories: count("category")?,
        chains: count("chain")?,
        hotels: count("hotel")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    fn id(value: i64) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure(&conn, true).unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn sample_batch() -> Vec<Entity> {
        vec![
            Entity::Category(Category::new(id(1), Some("cat_name".to_string()))),
            Entity::Chain(Chain::new(id(2), Some("cha_name".to_string()))),
            Entity::Hotel(Hotel {
                hotel_id: id(12321),
                hotel_name: "hot_name".to_string(),
                category_id: Some(id(1)),
                chain_id: Some(id(2)),
                location: Some("11.111,22.222".to_string()),
            }),
        ]
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut conn = memory_db();

        let inserted = insert_entities(&mut conn, &sample_batch()).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(
            get_all_categories(&conn).unwrap(),
            vec![Category::new(id(1), Some("cat_name".to_string()))]
        );
        assert_eq!(
            get_all_chains(&conn).unwrap(),
            vec![Chain::new(id(2), Some("cha_name".to_string()))]
        );
        let hotels = get_all_hotels(&conn).unwrap();
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].location.as_deref(), Some("11.111,22.222"));
        assert_eq!(verify_counts(&conn).unwrap().total(), 3);
    }

    #[test]
    fn test_empty_batch_commits_nothing() {
        let mut conn = memory_db();

        assert_eq!(insert_entities(&mut conn, &[]).unwrap(), 0);
        assert_eq!(verify_counts(&conn).unwrap(), TableCounts::default());
    }

    #[test]
    fn test_duplicate_primary_key_rolls_back_everything() {
        let mut conn = memory_db();
        insert_entities(&mut conn, &sample_batch()).unwrap();

        // Second import of the same batch: no upsert, the first row already clashes
        let second = vec![
            Entity::Category(Category::new(id(5), Some("new".to_string()))),
            Entity::Category(Category::new(id(1), Some("cat_name".to_string()))),
        ];
        let result = insert_entities(&mut conn, &second);

        assert!(matches!(result, Err(IngestError::Database(_))));
        let counts = verify_counts(&conn).unwrap();
        assert_eq!(counts.categories, 1, "category 5 must not survive the rollback");
    }

    #[test]
    fn test_dangling_foreign_key_fails_when_enforced() {
        let mut conn = memory_db();
        let batch = vec![Entity::Hotel(Hotel {
            hotel_id: id(1),
            hotel_name: "orphan".to_string(),
            category_id: Some(id(99)),
            chain_id: None,
            location: None,
        })];

        assert!(insert_entities(&mut conn, &batch).is_err());
        assert_eq!(verify_counts(&conn).unwrap().hotels, 0);
    }

    #[test]
    fn test_dangling_foreign_key_allowed_when_not_enforced() {
        let mut conn = Connection::open_in_memory().unwrap();
        configure(&conn, false).unwrap();
        setup_database(&conn).unwrap();
        let batch = vec![Entity::Hotel(Hotel {
            hotel_id: id(1),
            hotel_name: "orphan".to_string(),
            category_id: Some(id(99)),
            chain_id: None,
            location: None,
        })];

        assert_eq!(insert_entities(&mut conn, &batch).unwrap(), 1);
        assert_eq!(get_all_hotels(&conn).unwrap()[0].category_id, Some(id(99)));
    }

    #[test]
    fn test_hotel_queued_before_its_category_still_commits() {
        let mut conn = memory_db();
        let mut batch = sample_batch();
        batch.rotate_left(2);
        assert!(matches!(batch[0], Entity::Hotel(_)));

        assert_eq!(insert_entities(&mut conn, &batch).unwrap(), 3);
        assert_eq!(get_all_hotels(&conn).unwrap()[0].category_id, Some(id(1)));
    }

    #[test]
    fn test_pipeline_commits_category_named_by_later_record() {
        use crate::builder::RecordBuilder;
        use crate::loader::records_from_value;
        use crate::pipeline::DataPipeline;
        use serde_json::json;

        let records = records_from_value(json!({
            "h1": {"property_id": 1, "name": "a", "category": {"id": 1}},
            "h2": {"property_id": 2, "name": "b", "category": {"id": 1, "name": "Hotel"}}
        }))
        .unwrap();
        let mut pipeline = DataPipeline::new(RecordBuilder::new(), SqliteGateway::new(memory_db()));

        let summary = pipeline.run(&records).unwrap();

        assert_eq!(summary.inserted, 3);
        let conn = pipeline.gateway().connection();
        assert_eq!(
            get_all_categories(conn).unwrap(),
            vec![Category::new(id(1), Some("Hotel".to_string()))]
        );
        assert_eq!(verify_counts(conn).unwrap().hotels, 2);
    }

    #[test]
    fn test_gateway_delegates_to_connection() {
        let mut gateway = SqliteGateway::new(memory_db());

        assert_eq!(gateway.insert(&sample_batch()).unwrap(), 3);
        assert_eq!(verify_counts(gateway.connection()).unwrap().hotels, 1);
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = memory_db();
        setup_database(&conn).unwrap();
        assert_eq!(verify_counts(&conn).unwrap().total(), 0);
    }
}
