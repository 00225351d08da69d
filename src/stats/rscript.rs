//! `Rscript` backend
//!
//! Each step is a short R script written to a temporary file and run with
//! `Rscript --vanilla`. The scripts load the `stm` package, optionally
//! installing it first.

use crate::config::schema::RConfig;
use crate::config::PlotKind;
use crate::error::{BenchError, BenchResult};
use crate::stats::{FitRequest, PlotRequest, StatsBackend};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Packages every script needs
const REQUIRED_PACKAGES: [&str; 3] = ["stm", "igraph", "tm"];

/// Lines of stderr kept in failure messages
const STDERR_TAIL: usize = 12;

/// Quote a value as an R string literal
pub fn r_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn r_path(path: &Path) -> String {
    r_string(&path.to_string_lossy())
}

fn r_vector(topics: &[u32]) -> String {
    let items: Vec<String> = topics.iter().map(u32::to_string).collect();
    format!("c({})", items.join(", "))
}

/// Script header: package check and `library(stm)`
pub fn prelude(config: &RConfig) -> String {
    let packages: Vec<String> = REQUIRED_PACKAGES.iter().map(|p| r_string(p)).collect();
    let on_missing = if config.install_missing_packages {
        format!(
            "if (length(missing) > 0) install.packages(missing, repos = {})",
            r_string(&config.cran_mirror)
        )
    } else {
        "if (length(missing) > 0) stop(paste(\"missing R packages:\", paste(missing, collapse = \", \")))"
            .to_string()
    };

    format!(
        "options(warn = 1)\n\
         required <- c({})\n\
         missing <- required[!(required %in% rownames(installed.packages()))]\n\
         {}\n\
         suppressPackageStartupMessages(library(stm))\n",
        packages.join(", "),
        on_missing
    )
}

/// Read the exported CSV and run stm's text processing on it
pub fn prepare_script(csv: &Path, output: &Path) -> String {
    format!(
        "data <- read.csv({csv}, stringsAsFactors = FALSE)\n\
         processed <- textProcessor(data$document, metadata = data, \
         removestopwords = FALSE, removepunctuation = FALSE, stem = FALSE)\n\
         out <- prepDocuments(processed$documents, processed$vocab, processed$meta, lower.thresh = 1)\n\
         docs <- out$documents\n\
         vocab <- out$vocab\n\
         meta <- out$meta\n\
         save(data, processed, out, docs, vocab, meta, file = {output})\n",
        csv = r_path(csv),
        output = r_path(output)
    )
}

/// Fit the structural topic model on a prepared corpus
pub fn fit_script(prepared: &Path, output: &Path, request: &FitRequest) -> String {
    let prevalence = request
        .prevalence
        .as_deref()
        .map(|rhs| format!(",\n  prevalence = ~ {}", rhs))
        .unwrap_or_default();

    format!(
        "load({prepared})\n\
         stm_fit <- stm(\n  documents = out$documents,\n  vocab = out$vocab,\n  K = {topics},\n  \
         max.em.its = {iterations},\n  data = out$meta,\n  init.type = \"Spectral\",\n  \
         gamma.prior = \"L1\"{prevalence}\n)\n\
         save(stm_fit, file = {output})\n",
        prepared = r_path(prepared),
        topics = request.topics,
        iterations = request.iterations,
        prevalence = prevalence,
        output = r_path(output)
    )
}

/// Render one plot of a fitted model as JPEG
pub fn plot_script(model: &Path, output: &Path, request: &PlotRequest) -> String {
    let body = match request.kind {
        PlotKind::TopicCorr => format!(
            "cormat <- topicCorr(stm_fit)\n\
             jpeg({}, width = 3.25, height = 3.25, res = 1200, units = \"in\")\n\
             plot(cormat)\n",
            r_path(output)
        ),
        PlotKind::Default => format!(
            "jpeg({})\nplot(stm_fit, topics = {})\n",
            r_path(output),
            r_vector(&request.topics)
        ),
        kind => format!(
            "jpeg({})\nplot(stm_fit, type = {}, topics = {})\n",
            r_path(output),
            r_string(kind.r_name()),
            r_vector(&request.topics)
        ),
    };

    format!(
        "load({})\n{}invisible(dev.off())\n",
        r_path(model),
        body
    )
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL);
    lines[start..].join("\n")
}

/// Runs analysis steps through `Rscript`
#[derive(Debug, Clone)]
pub struct RscriptBackend {
    config: RConfig,
}

impl RscriptBackend {
    pub fn new(config: RConfig) -> Self {
        Self { config }
    }

    /// First line of `Rscript --version`
    pub async fn version(&self) -> BenchResult<String> {
        let output = Command::new(&self.config.rscript)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BenchError::command_failed(format!("{} --version", self.config.rscript), e))?;

        // R prints its version to stderr on older releases
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Run a script body behind the prelude
    async fn run(&self, step: &str, body: &str) -> BenchResult<()> {
        let script = format!("{}{}", prelude(&self.config), body);
        let script_path =
            std::env::temp_dir().join(format!("stmbench-{}.R", uuid::Uuid::new_v4().simple()));

        fs::write(&script_path, &script)
            .await
            .map_err(|e| BenchError::io(format!("writing {}", script_path.display()), e))?;
        debug!("Running {} via {}:\n{}", step, self.config.rscript, script);

        let result = Command::new(&self.config.rscript)
            .arg("--vanilla")
            .arg(&script_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        if let Err(e) = fs::remove_file(&script_path).await {
            debug!("Could not remove {}: {}", script_path.display(), e);
        }

        let output = result.map_err(|e| {
            BenchError::external(
                step,
                format!(
                    "could not start {}: {} (is R installed? set [r] rscript)",
                    self.config.rscript, e
                ),
            )
        })?;

        if !output.status.success() {
            return Err(BenchError::external(step, stderr_tail(&output.stderr)));
        }

        debug!("{} output:\n{}", step, String::from_utf8_lossy(&output.stdout));
        Ok(())
    }
}

#[async_trait]
impl StatsBackend for RscriptBackend {
    fn backend_name(&self) -> &'static str {
        "Rscript"
    }

    async fn is_available(&self) -> bool {
        self.version().await.is_ok()
    }

    async fn prepare_corpus(&self, csv: &Path, output: &Path) -> BenchResult<()> {
        info!("Preparing corpus from {}", csv.display());
        self.run("corpus preparation", &prepare_script(csv, output))
            .await
    }

    async fn fit_model(
        &self,
        prepared: &Path,
        output: &Path,
        request: &FitRequest,
    ) -> BenchResult<()> {
        info!(
            "Fitting model with {} topics, at most {} iterations",
            request.topics, request.iterations
        );
        self.run("model fit", &fit_script(prepared, output, request))
            .await
    }

    async fn render_plot(
        &self,
        model: &Path,
        output: &Path,
        request: &PlotRequest,
    ) -> BenchResult<()> {
        info!("Rendering {} plot", request.kind);
        self.run("plot rendering", &plot_script(model, output, request))
            .await
    }
}
