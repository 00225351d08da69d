//! Configurable units and the update pipeline
//!
//! A [`ConfigurableUnit`] pairs a unit kind (corpus, stm, plot) with the
//! directory its cache lives under. Each [`ConfigurableUnit::update`] call
//! recomputes options, fingerprint and directory, then either verifies the
//! existing record (cache hit) or records the new configuration and runs the
//! kind's callback.

use crate::error::{BenchError, BenchResult};
use crate::settings::fingerprint::Fingerprint;
use crate::settings::options::Options;
use crate::settings::record::{self, RecordStatus};
use crate::settings::resolver;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-kind behaviour plugged into the generic unit
#[async_trait]
pub trait UnitKind: Send + Sync {
    /// Unit name, used as the cache directory prefix
    fn name(&self) -> &'static str;

    /// Current options, after any normalization
    fn options(&self) -> BenchResult<Options>;

    /// Runs once per new configuration, after the record is written.
    ///
    /// Implementations must check for each artifact they produce, since a
    /// directory can be new while an artifact from an earlier attempt exists
    /// and vice versa.
    async fn on_new_configuration(&mut self, _cache_directory: &Path) -> BenchResult<()> {
        Ok(())
    }
}

/// Validation state of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Options or parent directory changed since the last update
    Unconfigured,
    /// Fingerprint and directory computed for the current options
    Validated {
        fingerprint: Fingerprint,
        cache_directory: PathBuf,
    },
}

/// Object-safe view of a unit, used by the cascade
#[async_trait]
pub trait Unit: Send {
    fn name(&self) -> &'static str;

    fn parent_directory(&self) -> &Path;

    /// Cache directory from the last successful update
    fn cache_directory(&self) -> Option<&Path>;

    /// Point the unit at a new parent directory; returns true if it moved
    fn rebase(&mut self, parent: &Path) -> bool;

    async fn update(&mut self) -> BenchResult<bool>;
}

/// A unit kind together with its position in the cache tree
#[derive(Debug)]
pub struct ConfigurableUnit<K> {
    kind: K,
    parent_directory: PathBuf,
    state: UnitState,
}

impl<K: UnitKind> ConfigurableUnit<K> {
    pub fn new(kind: K, parent_directory: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            parent_directory: parent_directory.into(),
            state: UnitState::Unconfigured,
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Mutate the kind's live settings; the unit must be updated again
    pub fn configure<R>(&mut self, f: impl FnOnce(&mut K) -> R) -> R {
        self.state = UnitState::Unconfigured;
        f(&mut self.kind)
    }

    pub fn state(&self) -> &UnitState {
        &self.state
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match &self.state {
            UnitState::Validated { fingerprint, .. } => Some(fingerprint),
            UnitState::Unconfigured => None,
        }
    }

    /// Cache directory, or an error naming the unit if it was never updated
    pub fn validated_directory(&self) -> BenchResult<&Path> {
        match &self.state {
            UnitState::Validated {
                cache_directory, ..
            } => Ok(cache_directory),
            UnitState::Unconfigured => Err(BenchError::Internal(format!(
                "{} used before its settings were validated",
                self.kind.name()
            ))),
        }
    }

    /// Fingerprint and directory for the current options, without touching disk
    pub fn preview(&self) -> BenchResult<(Fingerprint, PathBuf)> {
        let fingerprint = self.kind.options()?.fingerprint()?;
        let path = resolver::directory_path(&self.parent_directory, self.kind.name(), &fingerprint);
        Ok((fingerprint, path))
    }

    /// Run one update cycle; returns true for a new configuration
    pub async fn update(&mut self) -> BenchResult<bool> {
        self.state = UnitState::Unconfigured;
        let name = self.kind.name();
        let canonical = self.kind.options()?.canonical_string()?;
        let fingerprint = Fingerprint::of(&canonical);

        let resolved = resolver::resolve(&self.parent_directory, name, &fingerprint).await?;

        let is_new = if resolved.is_new {
            true
        } else {
            match record::verify(&resolved.path, &canonical).await? {
                RecordStatus::Matches => false,
                RecordStatus::Missing => {
                    warn!(
                        "Cache directory {} has no {}, completing interrupted setup",
                        resolved.path.display(),
                        record::SETTINGS_RECORD
                    );
                    true
                }
            }
        };

        if is_new {
            info!("{} settings changed, recording {}", name, fingerprint.short());
            record::write(&resolved.path, &canonical).await?;
        }

        self.state = UnitState::Validated {
            fingerprint,
            cache_directory: resolved.path.clone(),
        };

        if !is_new {
            debug!("{} settings unchanged ({})", name, fingerprint.short());
            return Ok(false);
        }

        self.kind.on_new_configuration(&resolved.path).await?;
        Ok(true)
    }
}

#[async_trait]
impl<K: UnitKind> Unit for ConfigurableUnit<K> {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn parent_directory(&self) -> &Path {
        &self.parent_directory
    }

    fn cache_directory(&self) -> Option<&Path> {
        match &self.state {
            UnitState::Validated {
                cache_directory, ..
            } => Some(cache_directory),
            UnitState::Unconfigured => None,
        }
    }

    fn rebase(&mut self, parent: &Path) -> bool {
        if self.parent_directory == parent {
            return false;
        }
        debug!(
            "{} parent moved to {}",
            self.kind.name(),
            parent.display()
        );
        self.parent_directory = parent.to_path_buf();
        self.state = UnitState::Unconfigured;
        true
    }

    async fn update(&mut self) -> BenchResult<bool> {
        ConfigurableUnit::update(self).await
    }
}
