//! Terminal UI
//!
//! Uses `cliclack` for step and spinner output in interactive terminals,
//! with automatic fallback to plain `[OK]`/`[FAIL]` lines in CI, pipes and
//! notebook kernels. The control panel tracks which action is running.
//!
//! # Example
//!
//! ```rust,ignore
//! use stmbench::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Fitting model...");
//! // ... do work ...
//! spinner.stop("Model fitted");
//!
//! ui::step_blocked(&ctx, "plot", "stm.RData is missing");
//! ```

mod context;
mod controls;
mod output;
mod progress;

pub use context::UiContext;
pub use controls::{Control, ControlPanel, Indicator, OperationScope};
pub use output::{
    intro, key_value, key_value_status, outro_error, outro_success, remark, section,
    step_blocked, step_error_detail, step_ok_detail, step_warn_hint,
};
pub use progress::{CascadeProgress, TaskSpinner};
