//! Cache-directory resolution
//!
//! Maps a parent directory, unit name and fingerprint to
//! `parent/<name>_<fingerprint>` and reports whether it was seen before.

use crate::error::{BenchError, BenchResult};
use crate::settings::fingerprint::Fingerprint;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Outcome of resolving a cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    pub path: PathBuf,
    /// True only for the call that created the directory
    pub is_new: bool,
}

/// Directory name for a unit configuration
pub fn directory_name(name: &str, fingerprint: &Fingerprint) -> String {
    format!("{}_{}", name, fingerprint.to_hex())
}

/// Path a unit configuration resolves to, without touching the filesystem
pub fn directory_path(parent: &Path, name: &str, fingerprint: &Fingerprint) -> PathBuf {
    parent.join(directory_name(name, fingerprint))
}

/// Resolve, creating the directory (and missing parents) on first use
pub async fn resolve(
    parent: &Path,
    name: &str,
    fingerprint: &Fingerprint,
) -> BenchResult<ResolvedDirectory> {
    let path = directory_path(parent, name, fingerprint);

    let exists = fs::try_exists(&path)
        .await
        .map_err(|e| BenchError::io(format!("checking {}", path.display()), e))?;

    if exists {
        debug!("Cache directory exists: {}", path.display());
        return Ok(ResolvedDirectory {
            path,
            is_new: false,
        });
    }

    fs::create_dir_all(&path)
        .await
        .map_err(|e| BenchError::io(format!("creating cache directory {}", path.display()), e))?;
    debug!("Created cache directory: {}", path.display());

    Ok(ResolvedDirectory { path, is_new: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directory_name_format() {
        let fp = Fingerprint::of("");
        assert_eq!(
            directory_name("corpus", &fp),
            "corpus_e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let fp = Fingerprint::of("(\"k\", 3)");

        let first = resolve(dir.path(), "stm", &fp).await.unwrap();
        let second = resolve(dir.path(), "stm", &fp).await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(first.path, second.path);
        assert!(first.path.is_dir());
    }

    #[tokio::test]
    async fn resolve_creates_missing_parents() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("corpora").join("nested");
        let fp = Fingerprint::of("x");

        let resolved = resolve(&parent, "corpus", &fp).await.unwrap();

        assert!(resolved.is_new);
        assert!(resolved.path.starts_with(&parent));
        assert!(resolved.path.is_dir());
    }

    #[tokio::test]
    async fn different_fingerprints_resolve_apart() {
        let dir = TempDir::new().unwrap();
        let a = resolve(dir.path(), "plot", &Fingerprint::of("a")).await.unwrap();
        let b = resolve(dir.path(), "plot", &Fingerprint::of("b")).await.unwrap();

        assert_ne!(a.path, b.path);
        assert!(a.is_new && b.is_new);
    }
}
