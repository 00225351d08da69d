//! Per-session workbench
//!
//! Owns the three configurable units, the statistics backend and the
//! session's control panel. Every action first re-validates the whole
//! corpus → stm → plot chain, then runs the producers it needs, each of
//! which checks for its own artifact.

use crate::artifact;
use crate::config::Config;
use crate::corpus::{stopwords, CorpusStore, CorpusUnit, CORPUS_CSV, PREPARED_CORPUS};
use crate::error::{BenchError, BenchResult};
use crate::model::{ModelUnit, MODEL_FILE};
use crate::plot::{self, PlotUnit};
use crate::settings::{revalidate_observed, ConfigurableUnit, Fingerprint, Unit, UnitKind};
use crate::stats::StatsBackend;
use crate::ui::{CascadeProgress, ControlPanel, UiContext};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A user-triggered action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Export (or re-export with `force`) and prepare the corpus
    BuildCorpus { force: bool },
    FitModel,
    RenderPlot,
}

impl Action {
    /// Name of the control this action is bound to
    pub fn control(&self) -> &'static str {
        match self {
            Self::BuildCorpus { .. } => "corpus",
            Self::FitModel => "fit",
            Self::RenderPlot => "plot",
        }
    }
}

/// Result of an action that did not abort the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed { artifact: PathBuf, reused: bool },
    /// An upstream artifact has to be produced first
    NotReady { reason: String },
    Failed { reason: String },
}

/// Artifact presence within a unit's cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub name: String,
    pub present: bool,
}

/// Snapshot of one unit after re-validation
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub name: &'static str,
    pub fingerprint: Fingerprint,
    pub directory: PathBuf,
    pub changed: bool,
    pub artifacts: Vec<ArtifactStatus>,
}

pub struct Workbench {
    corpus: ConfigurableUnit<CorpusUnit>,
    model: ConfigurableUnit<ModelUnit>,
    plot: ConfigurableUnit<PlotUnit>,
    backend: Box<dyn StatsBackend>,
    controls: ControlPanel,
    ctx: UiContext,
}

impl Workbench {
    /// Check the data sources and build the units.
    ///
    /// Nothing under the cache root is touched until the first action.
    pub async fn open(
        config: &Config,
        backend: Box<dyn StatsBackend>,
        ctx: UiContext,
    ) -> BenchResult<Self> {
        let root = &config.data.root;
        if !root.is_dir() {
            return Err(BenchError::source_missing("data root", root));
        }
        let database = config.data.database_path();
        if !database.is_file() {
            return Err(BenchError::source_missing("database", database));
        }

        let base_stopwords = stopwords::load_base(config.data.stopwords.as_deref()).await?;

        let store = CorpusStore::new(&database, &config.data.table)?;
        let categories = {
            let store = store.clone();
            tokio::task::spawn_blocking(move || store.categories())
                .await
                .map_err(|e| BenchError::Internal(format!("category scan failed: {}", e)))??
        };
        debug!(
            "Opened {} with {} author and {} work categories",
            database.display(),
            categories.authors.len(),
            categories.works.len()
        );

        let corpora = config.data.corpora_dir();
        let corpus = CorpusUnit::new(
            config.corpus.clone(),
            base_stopwords,
            store,
            categories.clone(),
        );
        let model = ModelUnit::new(config.model.clone(), categories);
        let plot = PlotUnit::new(config.plot.clone());

        let mut controls = ControlPanel::new();
        controls.register("corpus", "Export and prepare the corpus");
        controls.register("fit", "Fit the topic model");
        controls.register("plot", "Render the plot");

        Ok(Self {
            corpus: ConfigurableUnit::new(corpus, &corpora),
            // rebased onto their parents by the first cascade
            model: ConfigurableUnit::new(model, &corpora),
            plot: ConfigurableUnit::new(plot, &corpora),
            backend,
            controls,
            ctx,
        })
    }

    pub fn corpus(&self) -> &ConfigurableUnit<CorpusUnit> {
        &self.corpus
    }

    pub fn corpus_mut(&mut self) -> &mut ConfigurableUnit<CorpusUnit> {
        &mut self.corpus
    }

    pub fn model(&self) -> &ConfigurableUnit<ModelUnit> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ConfigurableUnit<ModelUnit> {
        &mut self.model
    }

    pub fn plot(&self) -> &ConfigurableUnit<PlotUnit> {
        &self.plot
    }

    pub fn plot_mut(&mut self) -> &mut ConfigurableUnit<PlotUnit> {
        &mut self.plot
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    pub fn backend(&self) -> &dyn StatsBackend {
        &*self.backend
    }

    /// Re-validate corpus, stm and plot in order; returns the changed flags
    pub async fn revalidate(&mut self) -> BenchResult<[bool; 3]> {
        cascade(&self.ctx, &mut self.corpus, &mut self.model, &mut self.plot).await
    }

    /// Run an action behind the control panel.
    ///
    /// Recoverable failures are absorbed into the outcome; integrity and
    /// source errors propagate.
    pub async fn perform(&mut self, action: Action) -> BenchResult<ActionOutcome> {
        let Self {
            corpus,
            model,
            plot,
            backend,
            controls,
            ctx,
        } = self;

        let mut scope = controls.begin(action.control());
        let result = run_action(action, ctx, corpus, model, plot, &**backend).await;

        match result {
            Ok((artifact, reused)) => {
                scope.succeed();
                Ok(ActionOutcome::Completed { artifact, reused })
            }
            Err(e) if e.is_not_ready() => {
                warn!("{} not ready: {}", action.control(), e);
                Ok(ActionOutcome::NotReady {
                    reason: e.to_string(),
                })
            }
            Err(e) if e.is_recoverable() => {
                warn!("{} failed: {}", action.control(), e);
                Ok(ActionOutcome::Failed {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Re-validate and describe every unit and its artifacts
    pub async fn report(&mut self) -> BenchResult<Vec<UnitReport>> {
        let [corpus_changed, model_changed, plot_changed] = self.revalidate().await?;

        let mut plot_artifacts = Vec::new();
        match self.plot.kind().request(self.model.kind().settings().topics) {
            Ok(request) => plot_artifacts.push(plot::image_name(request.kind, &request.topics)),
            Err(e) => debug!("No plot artifact for current selection: {}", e),
        }

        Ok(vec![
            unit_report(&self.corpus, corpus_changed, &[CORPUS_CSV, PREPARED_CORPUS]).await?,
            unit_report(&self.model, model_changed, &[MODEL_FILE]).await?,
            unit_report(&self.plot, plot_changed, plot_artifacts.as_slice()).await?,
        ])
    }
}

async fn cascade(
    ctx: &UiContext,
    corpus: &mut ConfigurableUnit<CorpusUnit>,
    model: &mut ConfigurableUnit<ModelUnit>,
    plot: &mut ConfigurableUnit<PlotUnit>,
) -> BenchResult<[bool; 3]> {
    let progress = CascadeProgress::new(ctx, 3);
    let chain: &mut [&mut dyn Unit] = &mut [&mut *corpus, &mut *model, &mut *plot];
    let changes = revalidate_observed(chain, &mut |name, changed| {
        progress.unit(name);
        progress.advance();
        if changed {
            info!("{} moved to a new cache directory", name);
        }
    })
    .await?;
    progress.finish();

    match changes.as_slice() {
        [c, m, p] => Ok([*c, *m, *p]),
        _ => Err(BenchError::Internal(format!(
            "expected 3 cascade results, got {}",
            changes.len()
        ))),
    }
}

async fn run_action(
    action: Action,
    ctx: &UiContext,
    corpus: &mut ConfigurableUnit<CorpusUnit>,
    model: &mut ConfigurableUnit<ModelUnit>,
    plot: &mut ConfigurableUnit<PlotUnit>,
    backend: &dyn StatsBackend,
) -> BenchResult<(PathBuf, bool)> {
    cascade(ctx, corpus, model, plot).await?;
    match action {
        Action::BuildCorpus { force } => build_corpus(corpus, backend, force).await,
        Action::FitModel => fit_model(corpus, model, backend).await,
        Action::RenderPlot => render_plot(model, plot, backend).await,
    }
}

fn require(artifact: &str, path: PathBuf) -> BenchResult<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(BenchError::MissingUpstreamArtifact {
            artifact: artifact.to_string(),
            path,
        })
    }
}

async fn build_corpus(
    corpus: &ConfigurableUnit<CorpusUnit>,
    backend: &dyn StatsBackend,
    force: bool,
) -> BenchResult<(PathBuf, bool)> {
    let dir = corpus.validated_directory()?;
    corpus.kind().export(dir, force).await?;

    let csv = CorpusUnit::csv_path(dir);
    let target = CorpusUnit::prepared_path(dir);
    let reused = artifact::produce("corpus preparation", &target, force, |staging| async move {
        backend.prepare_corpus(&csv, &staging).await
    })
    .await?;
    Ok((target, reused))
}

async fn fit_model(
    corpus: &ConfigurableUnit<CorpusUnit>,
    model: &ConfigurableUnit<ModelUnit>,
    backend: &dyn StatsBackend,
) -> BenchResult<(PathBuf, bool)> {
    let corpus_dir = corpus.validated_directory()?;
    corpus.kind().export(corpus_dir, false).await?;
    let prepared = require("prepared corpus", CorpusUnit::prepared_path(corpus_dir))?;

    let target = ModelUnit::model_path(model.validated_directory()?);
    let request = model.kind().fit_request();
    let reused = artifact::produce("model fit", &target, false, |staging| async move {
        backend.fit_model(&prepared, &staging, &request).await
    })
    .await?;
    Ok((target, reused))
}

async fn render_plot(
    model: &ConfigurableUnit<ModelUnit>,
    plot: &ConfigurableUnit<PlotUnit>,
    backend: &dyn StatsBackend,
) -> BenchResult<(PathBuf, bool)> {
    let fitted = require("fitted model", ModelUnit::model_path(model.validated_directory()?))?;

    let request = plot.kind().request(model.kind().settings().topics)?;
    let target = plot
        .validated_directory()?
        .join(plot::image_name(request.kind, &request.topics));
    let reused = artifact::produce("plot rendering", &target, false, |staging| async move {
        backend.render_plot(&fitted, &staging, &request).await
    })
    .await?;
    Ok((target, reused))
}

async fn unit_report<K: UnitKind, S: AsRef<str>>(
    unit: &ConfigurableUnit<K>,
    changed: bool,
    artifact_names: &[S],
) -> BenchResult<UnitReport> {
    let directory = unit.validated_directory()?;
    let fingerprint = *unit
        .fingerprint()
        .ok_or_else(|| BenchError::Internal(format!("{} has no fingerprint", unit.kind().name())))?;

    let mut artifacts = Vec::with_capacity(artifact_names.len());
    for name in artifact_names {
        let name = name.as_ref();
        artifacts.push(ArtifactStatus {
            name: name.to_string(),
            present: artifact::exists(&directory.join(name)).await?,
        });
    }

    Ok(UnitReport {
        name: unit.kind().name(),
        fingerprint,
        directory: directory.to_path_buf(),
        changed,
        artifacts,
    })
}
