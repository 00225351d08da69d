//! Session control panel
//!
//! Each user action ("corpus", "fit", "plot") is a registered control. While
//! an action runs, every control is busy and disabled; the
//! [`OperationScope`] guard restores them however the action ends.

use std::fmt;
use tracing::debug;

/// Visual state of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Busy,
    Succeeded,
    Failed,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Succeeded => "ok",
            Self::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// One action trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    name: &'static str,
    description: &'static str,
    enabled: bool,
    indicator: Indicator,
}

impl Control {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }
}

/// Controls registered for one session
#[derive(Debug, Default)]
pub struct ControlPanel {
    controls: Vec<Control>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control; registering a name twice keeps the first
    pub fn register(&mut self, name: &'static str, description: &'static str) {
        if self.get(name).is_some() {
            return;
        }
        self.controls.push(Control {
            name,
            description,
            enabled: true,
            indicator: Indicator::Idle,
        });
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// True while an operation holds the panel
    pub fn is_busy(&self) -> bool {
        self.controls.iter().any(|c| !c.enabled)
    }

    /// Start an operation triggered by `trigger`.
    ///
    /// The panel stays disabled until the returned guard is dropped; the
    /// trigger ends up `Failed` unless [`OperationScope::succeed`] was called.
    pub fn begin(&mut self, trigger: &'static str) -> OperationScope<'_> {
        debug!("Operation '{}' started", trigger);
        for control in &mut self.controls {
            control.enabled = false;
            control.indicator = Indicator::Busy;
        }
        OperationScope {
            panel: self,
            trigger,
            succeeded: false,
        }
    }
}

/// Guard for a running operation
#[must_use = "dropping the scope immediately ends the operation"]
pub struct OperationScope<'a> {
    panel: &'a mut ControlPanel,
    trigger: &'static str,
    succeeded: bool,
}

impl OperationScope<'_> {
    pub fn trigger(&self) -> &'static str {
        self.trigger
    }

    /// Mark the operation as successful
    pub fn succeed(&mut self) {
        self.succeeded = true;
    }
}

impl Drop for OperationScope<'_> {
    fn drop(&mut self) {
        let outcome = if self.succeeded {
            Indicator::Succeeded
        } else {
            Indicator::Failed
        };

        for control in &mut self.panel.controls {
            control.enabled = true;
            control.indicator = if control.name == self.trigger {
                outcome
            } else {
                Indicator::Idle
            };
        }
        debug!("Operation '{}' finished: {}", self.trigger, outcome);
    }
}
