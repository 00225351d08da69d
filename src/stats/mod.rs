//! Statistics backend abstraction
//!
//! Corpus preparation, model fitting and plot rendering are opaque external
//! steps. Each writes exactly one file at the output path it is given; the
//! caller takes care of staging and existence checks.

pub mod rscript;

pub use rscript::RscriptBackend;

use crate::config::PlotKind;
use crate::error::BenchResult;
use async_trait::async_trait;
use std::path::Path;

/// Parameters of one model fit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitRequest {
    pub topics: u32,
    pub iterations: u32,
    /// Right-hand side of the prevalence formula, e.g. `auth_cicero + letter`
    pub prevalence: Option<String>,
}

/// Parameters of one plot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotRequest {
    pub kind: PlotKind,
    /// Selected topics, ascending; empty for kinds that ignore selection
    pub topics: Vec<u32>,
}

/// External statistics runtime
#[async_trait]
pub trait StatsBackend: Send + Sync {
    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;

    /// Check if the runtime can be started on this system
    async fn is_available(&self) -> bool;

    /// Turn an exported CSV into a prepared corpus
    async fn prepare_corpus(&self, csv: &Path, output: &Path) -> BenchResult<()>;

    /// Fit a topic model on a prepared corpus
    async fn fit_model(&self, prepared: &Path, output: &Path, request: &FitRequest)
        -> BenchResult<()>;

    /// Render a plot of a fitted model
    async fn render_plot(&self, model: &Path, output: &Path, request: &PlotRequest)
        -> BenchResult<()>;
}
