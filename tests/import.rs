use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use hotel_etl::{
    get_all_categories, get_all_chains, get_all_hotels, load_records, verify_counts,
    DataPipeline, EntityId, RecordBuilder, SqliteGateway,
};

const PROVIDER_JSON: &str = r#"{
    "h1": {
        "property_id": 10000032,
        "name": "hotel 107",
        "category": {"id": 1, "name": "Hotel"},
        "chain": {"id": 0, "name": "Independent"},
        "location": {
            "coordinates": {"latitude": 11.111, "longitude": 22.222},
            "obfuscation_required": false
        }
    },
    "h2": {
        "property_id": "10000527",
        "name": "hotel 0",
        "category": {"id": "1", "name": "Hotel"},
        "chain": {"id": "0", "name": "Independent"},
        "location": {
            "coordinates": {"latitude": 42.60803, "longitude": 8.864105},
            "obfuscated_coordinates": {"latitude": 42.6, "longitude": 8.86},
            "obfuscation_required": true
        }
    },
    "h3": {"property_id": "bad", "name": "X"},
    "h4": {"property_id": 77, "name": null, "category": {"id": 2, "name": "Hostel"}}
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn id(value: i64) -> EntityId {
    EntityId::new(value).unwrap()
}

#[test]
fn test_library_import_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "hotels.json", PROVIDER_JSON);
    let db_path = dir.path().join("hotels.db");

    let records = load_records(&input).unwrap();
    let gateway = SqliteGateway::open(&db_path, true).unwrap();
    let mut pipeline = DataPipeline::new(RecordBuilder::new(), gateway);
    let summary = pipeline.run(&records).unwrap();

    // Category 1, chain 0, hotels 10000032 + 10000527, category 2 from the nameless hotel
    assert_eq!(summary.inserted, 5);
    assert_eq!(summary.stats.records, 4);

    let conn = pipeline.into_gateway().into_connection();
    let categories = get_all_categories(&conn).unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].category_name.as_deref(), Some("Hotel"));
    assert_eq!(get_all_chains(&conn).unwrap().len(), 1);

    let hotels = get_all_hotels(&conn).unwrap();
    assert_eq!(hotels.len(), 2);
    assert_eq!(hotels[0].hotel_id, id(10000032));
    assert_eq!(hotels[0].location.as_deref(), Some("11.111,22.222"));
    assert_eq!(hotels[1].hotel_id, id(10000527));
    assert_eq!(hotels[1].location.as_deref(), Some("42.6,8.86"));
    assert_eq!(hotels[1].category_id, Some(id(1)));
    assert_eq!(hotels[1].chain_id, Some(id(0)));
}

#[test]
fn test_malformed_record_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "hotels.json",
        r#"{"h1": {"property_id": 1, "name": "a"}, "h2": [1, 2]}"#,
    );
    let db_path = dir.path().join("hotels.db");

    let records = load_records(&input).unwrap();
    let mut pipeline = DataPipeline::new(
        RecordBuilder::new(),
        SqliteGateway::open(&db_path, true).unwrap(),
    );

    assert!(pipeline.run(&records).is_err());
    let counts = verify_counts(pipeline.gateway().connection()).unwrap();
    assert_eq!(counts.total(), 0);
}

fn config_ini(dir: &Path, input: &Path) -> PathBuf {
    let contents = format!(
        "[log]\nlog_file = {}\nlog_level = WARNING\n\n[db]\npath = {}\n\n[data]\npath = {}\n",
        dir.join("etl.log").display(),
        dir.join("hotels.db").display(),
        input.display()
    );
    write(dir, "config.ini", &contents)
}

#[test]
fn test_binary_imports_and_logs_diagnostics() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "hotels.json", PROVIDER_JSON);
    let config = config_ini(dir.path(), &input);

    let output = Command::new(env!("CARGO_BIN_EXE_hotel-etl"))
        .arg("--config")
        .arg(&config)
        .env_remove("RUST_LOG")
        .output()
        .expect("run hotel-etl");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let conn = Connection::open(dir.path().join("hotels.db")).unwrap();
    assert_eq!(verify_counts(&conn).unwrap().total(), 5);

    let log = fs::read_to_string(dir.path().join("etl.log")).unwrap();
    assert!(log.contains("[h3]"), "log: {}", log);
    assert!(log.contains("property_id could not be read"), "log: {}", log);
}

#[test]
fn test_binary_fails_on_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "hotels.json", "{}");
    let config = config_ini(dir.path(), &input);

    let output = Command::new(env!("CARGO_BIN_EXE_hotel-etl"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("run hotel-etl");

    assert!(!output.status.success());
    let log = fs::read_to_string(dir.path().join("etl.log")).unwrap();
    assert!(log.contains("JSON data is empty"), "log: {}", log);
}
