//! Advisory outcomes.
//!
//! Lifecycle operations distinguish fatal failures (returned as `Err`,
//! abort the operation) from advisory ones (collected, printed in the
//! summary, never change the exit code). This module is the advisory half.

use std::fmt;

/// A non-fatal problem observed during a lifecycle step.
#[derive(Debug, Clone)]
pub struct Advisory {
    /// Which step produced the warning (`drain`, `backup`, `snapshot`, ...).
    pub step: &'static str,
    /// What went wrong.
    pub message: String,
}

impl Advisory {
    #[must_use]
    pub fn new(step: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.message)
    }
}

/// Print every advisory as a warning, with a lead-in when there are any.
pub fn report_warnings(warnings: &[Advisory]) {
    if warnings.is_empty() {
        return;
    }
    crate::ui::print_warning(&format!(
        "{} step(s) completed with warnings:",
        warnings.len()
    ));
    for warning in warnings {
        crate::ui::print_warning(&format!("  {warning}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_display() {
        let advisory = Advisory::new("drain", "node worker-1 did not drain");
        assert_eq!(advisory.to_string(), "drain: node worker-1 did not drain");
    }
}
