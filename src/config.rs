// ⚙️ Settings - config.ini + HOTEL_ETL__* environment + CLI overrides
//
// [log]   log_file, log_level
// [db]    path, enforce_foreign_keys
// [data]  path

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::IngestResult;

pub const ENV_PREFIX: &str = "HOTEL_ETL";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log: LogSettings,
    pub db: DbSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Append log lines here; stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbSettings {
    pub path: PathBuf,
    pub enforce_foreign_keys: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    pub path: PathBuf,
}

/// Values given on the command line; they beat both file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

impl Settings {
    /// Layered load: defaults, then the INI file (if present), then
    /// environment, then CLI overrides.
    pub fn load(path: &Path, overrides: &Overrides) -> IngestResult<Self> {
        let config = Config::builder()
            .set_default("log.log_level", "info")?
            .set_default("db.enforce_foreign_keys", true)?
            .add_source(
                File::new(&path.to_string_lossy(), FileFormat::Ini).required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("data.path", path_string(&overrides.input))?
            .set_override_option("db.path", path_string(&overrides.database))?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}
