//! Error types for stmbench
//!
//! All modules use `BenchResult<T>` as their return type.

use crate::settings::OptionKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stmbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// All errors that can occur in stmbench
#[derive(Error, Debug)]
pub enum BenchError {
    // Configuration source errors
    #[error("Could not find {what}: {}", path.display())]
    ConfigurationSourceMissing { what: String, path: PathBuf },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Settings errors
    #[error("Settings integrity violation in {}: {reason}", directory.display())]
    SettingsIntegrityViolation { directory: PathBuf, reason: String },

    #[error("Unknown option '{key}' for {unit}")]
    UnknownOption { unit: String, key: String },

    #[error("Option '{key}' of {unit} expects a {expected} value")]
    OptionKindMismatch {
        unit: String,
        key: String,
        expected: OptionKind,
    },

    #[error("Option '{key}' of {unit} has no value")]
    MissingOption { unit: String, key: String },

    // External collaborator errors
    #[error("{step} failed: {reason}")]
    ExternalCallbackFailure { step: String, reason: String },

    #[error("Not ready: {artifact} is missing ({})", path.display())]
    MissingUpstreamArtifact { artifact: String, path: PathBuf },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    // Store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an external callback failure for a named step
    pub fn external(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalCallbackFailure {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration-source-missing error
    pub fn source_missing(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::ConfigurationSourceMissing {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Check if the action boundary may absorb this error.
    ///
    /// Integrity and source errors are never recoverable: they abort the
    /// session instead of being shown as a failed action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ExternalCallbackFailure { .. }
                | Self::MissingUpstreamArtifact { .. }
                | Self::InvalidSelection(_)
        )
    }

    /// Check if this error means an upstream step has to run first
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::MissingUpstreamArtifact { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigurationSourceMissing { .. } => {
                Some("Check [data] root and database in your config (stmbench config show)")
            }
            Self::SettingsIntegrityViolation { .. } => Some(
                "The cache directory was modified outside stmbench; inspect or remove it manually",
            ),
            Self::MissingUpstreamArtifact { .. } => {
                Some("Run the upstream step first: stmbench corpus, then stmbench fit")
            }
            Self::CommandFailed { .. } => Some("Is R installed? Set [r] rscript in your config"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BenchError::source_missing("database", "/data/corpus.sqlite3");
        assert_eq!(
            err.to_string(),
            "Could not find database: /data/corpus.sqlite3"
        );
    }

    #[test]
    fn error_hint() {
        let err = BenchError::MissingUpstreamArtifact {
            artifact: "fitted model".to_string(),
            path: PathBuf::from("/tmp/stm.RData"),
        };
        assert!(err.hint().unwrap().contains("stmbench fit"));
        assert!(BenchError::Internal("x".to_string()).hint().is_none());
    }

    #[test]
    fn error_recoverable() {
        assert!(BenchError::external("model fit", "boom").is_recoverable());
        assert!(BenchError::InvalidSelection("x".to_string()).is_recoverable());
        assert!(!BenchError::SettingsIntegrityViolation {
            directory: PathBuf::from("/tmp"),
            reason: "differs".to_string(),
        }
        .is_recoverable());
        assert!(!BenchError::source_missing("data root", "/nope").is_recoverable());
    }
}
