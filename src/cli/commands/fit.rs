//! Fit command - fit the topic model

use super::perform;
use crate::config::Config;
use crate::error::BenchResult;
use crate::workbench::Action;
use std::process::ExitCode;

/// Execute the fit command
pub async fn execute(config: &Config) -> BenchResult<ExitCode> {
    let title = format!("stmbench fit ({} topics)", config.model.topics);
    perform(config, Action::FitModel, &title).await
}
