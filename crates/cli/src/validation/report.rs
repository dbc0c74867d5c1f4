//! Validation report types and formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result of a validation check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "✅ PASS"),
            Self::Fail => write!(f, "❌ FAIL"),
            Self::Skip => write!(f, "⏭️  SKIP"),
        }
    }
}

/// A single validation check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

impl CheckResult {
    #[must_use]
    pub fn pass(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: details.into(),
        }
    }

    #[must_use]
    pub fn fail(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: details.into(),
        }
    }

    #[must_use]
    pub fn skip(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            details: details.into(),
        }
    }
}

/// The complete validation report for one cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub cluster: String,
    pub timestamp: String,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    #[must_use]
    pub fn new(cluster: String) -> Self {
        Self {
            cluster,
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks: Vec::new(),
        }
    }

    pub fn push(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all validation checks passed (skips don't count against).
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Fail)
    }

    #[must_use]
    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Pass)
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count()
    }

    /// Print a summary of the validation report.
    pub fn print_summary(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              CLUSTER VALIDATION REPORT                       ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Cluster: {:<52} ║", truncate(&self.cluster, 52));
        println!("║ Time:    {:<52} ║", truncate(&self.timestamp, 52));
        println!("╠══════════════════════════════════════════════════════════════╣");

        for check in &self.checks {
            let status_icon = match check.status {
                CheckStatus::Pass => "✅",
                CheckStatus::Fail => "❌",
                CheckStatus::Skip => "⏭️ ",
            };
            println!(
                "║ {} {:<20} {:<35} ║",
                status_icon,
                truncate(&check.name, 20),
                truncate(&check.details, 35)
            );
        }

        println!("╠══════════════════════════════════════════════════════════════╣");
        println!(
            "║ SUMMARY: {}/{} checks passed                                  ║",
            self.passed_count(),
            self.total_checks()
        );

        if self.all_passed() {
            println!("║ ✅ CLUSTER VALIDATION PASSED                                  ║");
        } else {
            println!("║ ⚠️  CLUSTER VALIDATION FOUND ISSUES                           ║");
        }

        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
    }
}

/// Truncate a string to a maximum length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ValidationReport::new("dev".into());
        report.push(CheckResult::pass("api", "reachable"));
        report.push(CheckResult::fail("nodes", "1/2 Ready"));
        report.push(CheckResult::skip("workloads", "no backup"));

        assert_eq!(report.total_checks(), 3);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_skips_do_not_fail_report() {
        let mut report = ValidationReport::new("dev".into());
        report.push(CheckResult::pass("api", "reachable"));
        report.push(CheckResult::skip("workloads", "no backup"));
        assert!(report.all_passed());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-rather-long-string", 10), "a-rathe...");
    }
}
