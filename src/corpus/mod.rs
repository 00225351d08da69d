//! Corpus unit
//!
//! Owns the corpus settings, the base stopword list and the store handle.
//! Its cache directory is the root of the cache tree: every model and plot
//! directory is nested inside one `corpus_<fp>` directory.

pub mod export;
pub mod stopwords;
pub mod store;

pub use store::{Categories, Category, CorpusStore};

use crate::artifact;
use crate::config::schema::CorpusConfig;
use crate::error::{BenchError, BenchResult};
use crate::settings::{OptionDescriptor, OptionKind, Options, Schema, UnitKind};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Exported corpus, input to the preparation step
pub const CORPUS_CSV: &str = "corpus.csv";

/// Prepared corpus, input to model fitting
pub const PREPARED_CORPUS: &str = "corpus.RData";

const DESCRIPTORS: &[OptionDescriptor] = &[
    OptionDescriptor::new("grouping", OptionKind::Text),
    OptionDescriptor::new("lemmatize", OptionKind::Flag),
    OptionDescriptor::new("min_length", OptionKind::Integer),
    OptionDescriptor::new("stopwords", OptionKind::Set),
    OptionDescriptor::excluded("user_stopwords", OptionKind::Set),
];

pub const SCHEMA: Schema = Schema::new("corpus", DESCRIPTORS);

/// Corpus settings plus what is needed to export them
#[derive(Debug, Clone)]
pub struct CorpusUnit {
    settings: CorpusConfig,
    base_stopwords: BTreeSet<String>,
    store: CorpusStore,
    categories: Categories,
}

impl CorpusUnit {
    pub fn new(
        settings: CorpusConfig,
        base_stopwords: BTreeSet<String>,
        store: CorpusStore,
        categories: Categories,
    ) -> Self {
        Self {
            settings,
            base_stopwords,
            store,
            categories,
        }
    }

    pub fn settings(&self) -> &CorpusConfig {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CorpusConfig {
        &mut self.settings
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    /// Effective stopwords: base list with the user directives applied
    pub fn stopwords(&self) -> BTreeSet<String> {
        stopwords::normalize(&self.base_stopwords, &self.settings.user_stopwords)
    }

    /// Export `corpus.csv` into `cache_directory`.
    ///
    /// Returns true if an existing export was kept.
    pub async fn export(&self, cache_directory: &Path, force: bool) -> BenchResult<bool> {
        let target = cache_directory.join(CORPUS_CSV);
        let store = self.store.clone();
        let categories = self.categories.clone();
        let stopwords = self.stopwords();
        let grouping = self.settings.grouping;
        let lemmatize = self.settings.lemmatize;
        let min_length = self.settings.min_length as usize;

        artifact::produce("corpus export", &target, force, |staging| async move {
            let rows = tokio::task::spawn_blocking(move || {
                let table = store
                    .export_rows(grouping, lemmatize, &categories)
                    .map_err(|e| BenchError::external("corpus export", e.to_string()))?;
                export::write_csv(&table, &staging, &stopwords, min_length)
            })
            .await
            .map_err(|e| BenchError::Internal(format!("export task failed: {}", e)))??;

            info!("Exported {} documents grouped by {}", rows, grouping);
            Ok(())
        })
        .await
    }

    /// Path of the exported CSV inside a corpus cache directory
    pub fn csv_path(cache_directory: &Path) -> PathBuf {
        cache_directory.join(CORPUS_CSV)
    }

    /// Path of the prepared corpus inside a corpus cache directory
    pub fn prepared_path(cache_directory: &Path) -> PathBuf {
        cache_directory.join(PREPARED_CORPUS)
    }
}

#[async_trait]
impl UnitKind for CorpusUnit {
    fn name(&self) -> &'static str {
        SCHEMA.unit()
    }

    fn options(&self) -> BenchResult<Options> {
        let directives: BTreeSet<String> = self
            .settings
            .user_stopwords
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();

        Options::new(SCHEMA)
            .with("grouping", self.settings.grouping.label())?
            .with("lemmatize", self.settings.lemmatize)?
            .with("min_length", self.settings.min_length)?
            .with("stopwords", self.stopwords())?
            .with("user_stopwords", directives)
    }

    async fn on_new_configuration(&mut self, cache_directory: &Path) -> BenchResult<()> {
        self.export(cache_directory, false).await?;
        Ok(())
    }
}
