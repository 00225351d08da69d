//! Corpus command - export and prepare the corpus

use super::perform;
use crate::cli::args::CorpusArgs;
use crate::config::Config;
use crate::error::BenchResult;
use crate::workbench::Action;
use std::process::ExitCode;

/// Execute the corpus command
pub async fn execute(args: CorpusArgs, config: &Config) -> BenchResult<ExitCode> {
    let title = if args.force {
        "stmbench corpus (rebuild)"
    } else {
        "stmbench corpus"
    };
    perform(config, Action::BuildCorpus { force: args.force }, title).await
}
