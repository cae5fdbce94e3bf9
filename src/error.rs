// 🚨 Error Taxonomy - fatal batch errors vs. per-field diagnostics
//
// Fatal errors abort the whole run and nothing is persisted.
// Diagnostics describe a sub-entity that degraded to null; the batch continues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::entities::EntityKind;

// ============================================================================
// FATAL ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("JSON data could not be read from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON data in {path} could not be parsed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON data must be an object of records, found {found}")]
    NotAMapping { found: &'static str },

    #[error("JSON data is empty")]
    EmptyInput,

    /// A record that is not an object at all. Field-level problems never land here.
    #[error("record {key} is malformed: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("configuration is invalid: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("logger could not be initialised: {0}")]
    Logging(String),
}

pub type IngestResult<T> = Result<T, IngestError>;

// ============================================================================
// PER-FIELD DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Entity(EntityKind),
    Location,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Entity(kind) => write!(f, "{}", kind.as_str()),
            Subject::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub subject: Subject,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(subject: Subject, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            subject,
            message: message.into(),
        }
    }

    pub fn error(subject: Subject, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            subject,
            message: message.into(),
        }
    }

    /// Log this diagnostic at its own severity, prefixed with the record key.
    pub fn emit(&self, record_key: &str) {
        match self.severity {
            Severity::Warning => log::warn!("[{}] {}", record_key, self),
            Severity::Error => log::error!("[{}] {}", record_key, self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.subject, self.message)
    }
}
