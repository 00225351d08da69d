//! Settings record guard
//!
//! The first cycle that creates a cache directory writes the canonical
//! settings string to `setting.txt`. Every later cycle re-reads it and
//! compares byte-for-byte. A mismatch means a fingerprint collision or
//! external tampering and aborts the cycle.

use crate::error::{BenchError, BenchResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Name of the record file inside every cache directory
pub const SETTINGS_RECORD: &str = "setting.txt";

/// Result of checking an existing cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Record present and identical to the recomputed string
    Matches,
    /// Directory exists but no record was written (interrupted first use)
    Missing,
}

/// Path of the record file in a cache directory
pub fn record_path(directory: &Path) -> PathBuf {
    directory.join(SETTINGS_RECORD)
}

/// Write the record with exclusive create.
///
/// An existing record is an integrity violation, never overwritten.
pub async fn write(directory: &Path, canonical: &str) -> BenchResult<()> {
    let path = record_path(directory);

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(BenchError::SettingsIntegrityViolation {
                directory: directory.to_path_buf(),
                reason: format!("{} already exists for a new configuration", SETTINGS_RECORD),
            });
        }
        Err(e) => {
            return Err(BenchError::io(format!("creating {}", path.display()), e));
        }
    };

    file.write_all(canonical.as_bytes())
        .await
        .map_err(|e| BenchError::io(format!("writing {}", path.display()), e))?;
    file.flush()
        .await
        .map_err(|e| BenchError::io(format!("flushing {}", path.display()), e))?;

    debug!("Recorded settings in {}", path.display());
    Ok(())
}

/// Compare the on-disk record with the recomputed canonical string
pub async fn verify(directory: &Path, canonical: &str) -> BenchResult<RecordStatus> {
    let path = record_path(directory);

    let recorded = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordStatus::Missing),
        Err(e) => return Err(BenchError::io(format!("reading {}", path.display()), e)),
    };

    if recorded != canonical.as_bytes() {
        return Err(BenchError::SettingsIntegrityViolation {
            directory: directory.to_path_buf(),
            reason: "read and calculated settings differ".to_string(),
        });
    }

    Ok(RecordStatus::Matches)
}

/// Read the record as text, if present
pub async fn read(directory: &Path) -> BenchResult<Option<String>> {
    let path = record_path(directory);
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BenchError::io(format!("reading {}", path.display()), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CANONICAL: &str = "(\"grouping\", \"Work\")\n(\"lemmatize\", true)";

    #[tokio::test]
    async fn write_then_verify_roundtrip() {
        let dir = TempDir::new().unwrap();

        write(dir.path(), CANONICAL).await.unwrap();

        assert_eq!(
            verify(dir.path(), CANONICAL).await.unwrap(),
            RecordStatus::Matches
        );
        assert_eq!(read(dir.path()).await.unwrap().as_deref(), Some(CANONICAL));
    }

    #[tokio::test]
    async fn second_write_is_violation() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), CANONICAL).await.unwrap();

        let err = write(dir.path(), CANONICAL).await.unwrap_err();
        assert!(matches!(err, BenchError::SettingsIntegrityViolation { .. }));
    }

    #[tokio::test]
    async fn tampered_record_is_violation() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), CANONICAL).await.unwrap();
        std::fs::write(record_path(dir.path()), "(\"grouping\", \"Author\")").unwrap();

        let err = verify(dir.path(), CANONICAL).await.unwrap_err();
        assert!(matches!(err, BenchError::SettingsIntegrityViolation { .. }));
    }

    #[tokio::test]
    async fn trailing_newline_is_a_difference() {
        let dir = TempDir::new().unwrap();
        std::fs::write(record_path(dir.path()), format!("{}\n", CANONICAL)).unwrap();

        assert!(verify(dir.path(), CANONICAL).await.is_err());
    }

    #[tokio::test]
    async fn missing_record_reported() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            verify(dir.path(), CANONICAL).await.unwrap(),
            RecordStatus::Missing
        );
        assert!(read(dir.path()).await.unwrap().is_none());
    }
}
