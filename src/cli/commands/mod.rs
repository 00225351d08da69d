//! CLI command implementations

pub mod cache;
pub mod config;
pub mod corpus;
pub mod fit;
pub mod plot;
pub mod status;

pub use cache::execute as cache;
pub use config::execute as config;
pub use corpus::execute as corpus;
pub use fit::execute as fit;
pub use plot::execute as plot;
pub use status::execute as status;

use crate::config::Config;
use crate::error::BenchResult;
use crate::stats::RscriptBackend;
use crate::ui::{self, UiContext};
use crate::workbench::{Action, ActionOutcome, Workbench};
use std::process::ExitCode;

/// Open a workbench over the configured data and R runtime
pub(crate) async fn open_workbench(config: &Config, ctx: &UiContext) -> BenchResult<Workbench> {
    let backend = RscriptBackend::new(config.r.clone());
    Workbench::open(config, Box::new(backend), ctx.clone()).await
}

/// Run one action and print its outcome.
///
/// Not-ready and failed outcomes exit non-zero without an error banner.
pub(crate) async fn perform(config: &Config, action: Action, title: &str) -> BenchResult<ExitCode> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, title);

    let mut bench = open_workbench(config, &ctx).await?;
    let outcome = bench.perform(action).await?;
    if print_outcome(&ctx, action, &outcome) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Print an action outcome; returns whether the action completed
fn print_outcome(ctx: &UiContext, action: Action, outcome: &ActionOutcome) -> bool {
    let name = action.control();
    match outcome {
        ActionOutcome::Completed { artifact, reused } => {
            let verb = if *reused { "Reused" } else { "Produced" };
            ui::step_ok_detail(ctx, &format!("{} {}", verb, name), &artifact.display().to_string());
            ui::outro_success(ctx, "Done");
            true
        }
        ActionOutcome::NotReady { reason } => {
            ui::step_blocked(ctx, name, reason);
            ui::remark(ctx, upstream_hint(action));
            false
        }
        ActionOutcome::Failed { reason } => {
            ui::step_error_detail(ctx, &format!("{} failed", name), reason);
            ui::outro_error(ctx, "Action failed; cached artifacts were left untouched");
            false
        }
    }
}

fn upstream_hint(action: Action) -> &'static str {
    match action {
        Action::BuildCorpus { .. } => "Check the corpus settings and try again",
        Action::FitModel => "Run `stmbench corpus` first",
        Action::RenderPlot => "Run `stmbench fit` first",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn completed_outcome_succeeds() {
        let ctx = UiContext::non_interactive();
        let outcome = ActionOutcome::Completed {
            artifact: PathBuf::from("/data/corpora/x/stm.RData"),
            reused: true,
        };
        assert!(print_outcome(&ctx, Action::FitModel, &outcome));
    }

    #[test]
    fn blocked_and_failed_outcomes_do_not_complete() {
        let ctx = UiContext::non_interactive();
        let blocked = ActionOutcome::NotReady {
            reason: "fitted model is missing".to_string(),
        };
        let failed = ActionOutcome::Failed {
            reason: "plot rendering failed".to_string(),
        };
        assert!(!print_outcome(&ctx, Action::RenderPlot, &blocked));
        assert!(!print_outcome(&ctx, Action::RenderPlot, &failed));
    }

    #[test]
    fn hints_point_upstream() {
        assert!(upstream_hint(Action::RenderPlot).contains("fit"));
        assert!(upstream_hint(Action::FitModel).contains("corpus"));
    }
}
