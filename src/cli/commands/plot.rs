//! Plot command - render a plot of the fitted model

use super::perform;
use crate::config::Config;
use crate::error::BenchResult;
use crate::workbench::Action;
use std::process::ExitCode;

/// Execute the plot command
pub async fn execute(config: &Config) -> BenchResult<ExitCode> {
    let title = format!("stmbench plot ({})", config.plot.kind);
    perform(config, Action::RenderPlot, &title).await
}
