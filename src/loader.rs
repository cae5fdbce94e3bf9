// 📂 JSON Loader - provider file → ordered records
//
// The file is one object keyed by an arbitrary record name ("h1", "h2", ...).
// Only the top-level shape is checked here; record contents are the
// builder's business.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::coerce::type_name;
use crate::error::{IngestError, IngestResult};

/// One input record, keyed by its name in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: Value,
}

impl Record {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Record {
            key: key.into(),
            value,
        }
    }
}

/// Read and split a JSON file into records, in document order.
pub fn load_records(path: &Path) -> IngestResult<Vec<Record>> {
    let result = fs::read_to_string(path)
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| {
            serde_json::from_str::<Value>(&text).map_err(|source| IngestError::Parse {
                path: path.to_path_buf(),
                source,
            })
        })
        .and_then(records_from_value);

    match result {
        Ok(records) => {
            log::info!("Loaded {} records from {}", records.len(), path.display());
            Ok(records)
        }
        Err(e) => {
            log::error!("{}", e);
            Err(e)
        }
    }
}

/// Split an already-parsed document into records.
pub fn records_from_value(document: Value) -> IngestResult<Vec<Record>> {
    let map = match document {
        Value::Object(map) => map,
        other => {
            return Err(IngestError::NotAMapping {
                found: type_name(&other),
            })
        }
    };

    if map.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    Ok(map
        .into_iter()
        .map(|(key, value)| Record::new(key, value))
        .collect())
}
