// 📝 Logging - env_logger backend configured from [log]

use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::str::FromStr;

use crate::config::LogSettings;
use crate::error::{IngestError, IngestResult};

/// Accepts both Rust (`warn`) and Python-style (`WARNING`, `CRITICAL`) names.
pub fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(LevelFilter::Warn),
        "critical" | "fatal" => Some(LevelFilter::Error),
        "notset" => Some(LevelFilter::Trace),
        other => LevelFilter::from_str(other).ok(),
    }
}

/// Install the global logger. `RUST_LOG`, when set, refines the configured level.
pub fn init(settings: &LogSettings) -> IngestResult<()> {
    let level = parse_level(&settings.log_level).ok_or_else(|| {
        IngestError::Logging(format!("unknown log level {:?}", settings.log_level))
    })?;

    let mut builder = Builder::new();
    builder.filter_level(level).parse_env(Env::default());

    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| IngestError::Logging(format!("{}: {}", path.display(), e)))?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never);
    }

    builder
        .try_init()
        .map_err(|e| IngestError::Logging(e.to_string()))
}
