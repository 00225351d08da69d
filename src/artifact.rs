//! Produce-once artifacts
//!
//! Every artifact (`corpus.csv`, `corpus.RData`, `stm.RData`, plot images) is
//! made at most once per cache directory. Producers write to a hidden staging
//! sibling and the result is renamed into place, so a file at the final path
//! is always complete.

use crate::error::{BenchError, BenchResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Check whether an artifact exists at `path`
pub async fn exists(path: &Path) -> BenchResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| BenchError::io(format!("checking {}", path.display()), e))
}

/// Hidden sibling path used while an artifact is being written
pub fn staging_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = format!(".{}.{}.partial", file_name, uuid::Uuid::new_v4().simple());
    target.with_file_name(staging)
}

/// Move a finished staging file onto its final path
pub async fn commit(staging: &Path, target: &Path) -> BenchResult<()> {
    fs::rename(staging, target).await.map_err(|e| {
        BenchError::io(
            format!("moving {} into place", target.display()),
            e,
        )
    })
}

/// Remove a staging file left by a failed producer
pub async fn discard(staging: &Path) {
    match fs::remove_file(staging).await {
        Ok(()) => debug!("Discarded {}", staging.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!("Could not discard {}: {}", staging.display(), e),
    }
}

/// Produce `target` unless it already exists.
///
/// `make` receives the staging path and must write the artifact there.
/// With `force`, an existing artifact is replaced. Returns true when an
/// existing artifact was reused.
pub async fn produce<F, Fut>(what: &str, target: &Path, force: bool, make: F) -> BenchResult<bool>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = BenchResult<()>>,
{
    if !force && exists(target).await? {
        debug!("{} found at {}, reusing", what, target.display());
        return Ok(true);
    }

    let staging = staging_path(target);
    if let Err(e) = make(staging.clone()).await {
        discard(&staging).await;
        return Err(e);
    }

    if !exists(&staging).await? {
        return Err(BenchError::external(
            what,
            format!("no output was written for {}", target.display()),
        ));
    }

    commit(&staging, target).await?;
    info!("Wrote {}", target.display());
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn staging_is_hidden_sibling() {
        let target = Path::new("/cache/corpus_ab/corpus.csv");
        let staging = staging_path(target);

        assert_eq!(staging.parent(), target.parent());
        let name = staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".corpus.csv."));
        assert!(name.ends_with(".partial"));
        assert_ne!(staging, staging_path(target));
    }

    #[tokio::test]
    async fn produces_then_reuses() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stm.RData");

        let reused = produce("model fit", &target, false, |staging| async move {
            std::fs::write(staging, "first").unwrap();
            Ok(())
        })
        .await
        .unwrap();
        assert!(!reused);

        let reused = produce("model fit", &target, false, |_| async {
            Err(BenchError::Internal("producer ran again".to_string()))
        })
        .await
        .unwrap();
        assert!(reused);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first");
    }

    #[tokio::test]
    async fn force_replaces() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("corpus.csv");
        std::fs::write(&target, "old").unwrap();

        produce("corpus export", &target, true, |staging| async move {
            std::fs::write(staging, "new").unwrap();
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[tokio::test]
    async fn failed_producer_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("corpus.RData");

        let err = produce("corpus preparation", &target, false, |staging| async move {
            std::fs::write(staging, "half").unwrap();
            Err(BenchError::external("corpus preparation", "R crashed"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, BenchError::ExternalCallbackFailure { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn silent_producer_is_failure() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("hist_topics_1.jpeg");

        let err = produce("plot rendering", &target, false, |_| async { Ok(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::ExternalCallbackFailure { .. }));
        assert!(!target.exists());
    }
}
