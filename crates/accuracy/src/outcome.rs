use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome severity. Ordering is `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    /// Failure means the backend cannot be trusted at all
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared importance of a case, used to grade adapter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Precondition for every other check (connectivity, single-symbol lookup)
    Foundational,
    BestEffort,
}

impl Criticality {
    pub fn severity(self) -> Severity {
        match self {
            Criticality::Foundational => Severity::Critical,
            Criticality::BestEffort => Severity::Warning,
        }
    }
}

/// Result of one named case. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub success: bool,
    pub details: String,
    pub severity: Severity,
}

impl TestOutcome {
    pub fn new(
        name: impl Into<String>,
        success: bool,
        details: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            name: name.into(),
            success,
            details: details.into(),
            severity,
        }
    }

    pub fn is_critical_failure(&self) -> bool {
        !self.success && self.severity == Severity::Critical
    }

    pub fn is_warning(&self) -> bool {
        !self.success && self.severity == Severity::Warning
    }
}
