//! Status command - show where the current settings live and what is built

use super::open_workbench;
use crate::config::Config;
use crate::error::BenchResult;
use crate::stats::RscriptBackend;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::workbench::UnitReport;

/// Execute the status command
pub async fn execute(config: &Config) -> BenchResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "stmbench status");

    let mut bench = open_workbench(config, &ctx).await?;

    ui::section(&ctx, "Data");
    ui::key_value(&ctx, "Root", &config.data.root.display().to_string());
    ui::key_value(
        &ctx,
        "Database",
        &config.data.database_path().display().to_string(),
    );
    ui::key_value(&ctx, "Table", &config.data.table);
    let stopwords = config
        .data
        .stopwords
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(placeholders only)".to_string());
    ui::key_value(&ctx, "Stopwords", &stopwords);
    let categories = bench.corpus().kind().categories();
    ui::key_value(
        &ctx,
        "Categories",
        &format!(
            "{} authors, {} works",
            categories.authors.len(),
            categories.works.len()
        ),
    );

    ui::section(&ctx, "Statistics runtime");
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Checking {}...", bench.backend().backend_name()));
    if bench.backend().is_available().await {
        let version = RscriptBackend::new(config.r.clone())
            .version()
            .await
            .unwrap_or_default();
        spinner.stop(&format!("{} available {}", config.r.rscript, version));
    } else {
        spinner.stop_warn(&format!(
            "{} not found; corpus export works, fitting and plotting will fail",
            config.r.rscript
        ));
    }

    let reports = bench.report().await?;
    for report in &reports {
        print_unit(&ctx, report);
    }

    let built = reports
        .iter()
        .flat_map(|r| r.artifacts.iter())
        .filter(|a| a.present)
        .count();
    let total: usize = reports.iter().map(|r| r.artifacts.len()).sum();
    ui::outro_success(&ctx, &format!("{}/{} artifacts built", built, total));

    Ok(())
}

fn print_unit(ctx: &UiContext, report: &UnitReport) {
    ui::section(ctx, report.name);
    ui::key_value(ctx, "Directory", &report.directory.display().to_string());
    let fingerprint = if report.changed {
        format!("{} (changed)", report.fingerprint.short())
    } else {
        report.fingerprint.short()
    };
    ui::key_value(ctx, "Fingerprint", &fingerprint);

    if report.artifacts.is_empty() {
        ui::remark(ctx, "No artifact for the current selection");
    }
    for artifact in &report.artifacts {
        let state = if artifact.present { "present" } else { "missing" };
        ui::key_value_status(ctx, &artifact.name, state, artifact.present);
    }
}
