//! User-facing notices raised by the core.
//!
//! The core never renders anything; it hands notices to an injected
//! [`Notifier`]. `TracingNotifier` just logs them.

use tracing::{error, info};

/// Label of the action offered with every demo-mode notice.
pub const EXIT_DEMO_LABEL: &str = "Exit demo";

/// Raised when the demo overlay rejects a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoNotice {
    /// What was attempted, plural ("adding transactions").
    pub action: String,
    pub message: String,
    /// Label of the one-click path out of demo mode.
    pub exit_label: &'static str,
}

impl DemoNotice {
    pub fn blocked(action: &str) -> Self {
        Self {
            action: action.to_string(),
            message: format!("Demo mode: {} are disabled.", action),
            exit_label: EXIT_DEMO_LABEL,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn demo_blocked(&self, notice: &DemoNotice);

    /// A hard failure worth showing to the user.
    fn error(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn demo_blocked(&self, notice: &DemoNotice) {
        info!(action = %notice.action, "{} ({})", notice.message, notice.exit_label);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_notice_text() {
        let notice = DemoNotice::blocked("adding transactions");
        assert_eq!(notice.message, "Demo mode: adding transactions are disabled.");
        assert_eq!(notice.exit_label, "Exit demo");
    }
}
