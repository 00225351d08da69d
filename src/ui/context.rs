//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables that mark a CI runner
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Environment variables set inside a Jupyter kernel
const NOTEBOOK_VARS: [&str; 2] = ["JPY_PARENT_PID", "JPY_SESSION_NAME"];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(|name| std::env::var_os(name).is_some()),
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we're in an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive(has_var: impl Fn(&str) -> bool) -> bool {
        if !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
            return false;
        }
        !Self::plain_environment(has_var)
    }

    /// CI runners and notebook kernels get plain output even with a TTY
    fn plain_environment(has_var: impl Fn(&str) -> bool) -> bool {
        CI_VARS.iter().chain(NOTEBOOK_VARS.iter()).any(|v| has_var(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_context() {
        let ctx = UiContext::non_interactive();
        assert!(!ctx.is_interactive());
        assert!(!ctx.use_fancy_output());
    }

    #[test]
    fn notebook_kernel_is_plain() {
        assert!(UiContext::plain_environment(|v| v == "JPY_PARENT_PID"));
        assert!(UiContext::plain_environment(|v| v == "GITHUB_ACTIONS"));
        assert!(!UiContext::plain_environment(|_| false));
    }
}
