use crate::aggregate::AggregateMetrics;
use crate::outcome::TestOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_READY_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    Ready,
    MostlyReady,
    NotReady,
}

impl ReadinessStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessStatus::Ready => "READY",
            ReadinessStatus::MostlyReady => "MOSTLY_READY",
            ReadinessStatus::NotReady => "NOT_READY",
        }
    }

    pub fn is_ready(self) -> bool {
        self == ReadinessStatus::Ready
    }
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessVerdict {
    pub status: ReadinessStatus,
    pub critical_failures: usize,
    pub warnings: usize,
    pub success_rate: f64,
}

/// Decision policy: any critical failure vetoes, otherwise the success rate decides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    pub ready_threshold: f64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            ready_threshold: DEFAULT_READY_THRESHOLD,
        }
    }
}

impl ReadinessPolicy {
    pub fn new(ready_threshold: f64) -> Self {
        Self { ready_threshold }
    }

    pub fn classify(&self, metrics: &AggregateMetrics, outcomes: &[TestOutcome]) -> ReadinessVerdict {
        let critical_failures = outcomes.iter().filter(|o| o.is_critical_failure()).count();
        let warnings = outcomes.iter().filter(|o| o.is_warning()).count();

        let status = if critical_failures > 0 {
            ReadinessStatus::NotReady
        } else if metrics.success_rate >= self.ready_threshold {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::MostlyReady
        };

        ReadinessVerdict {
            status,
            critical_failures,
            warnings,
            success_rate: metrics.success_rate,
        }
    }
}

/// Classify with the default 80% threshold.
pub fn classify(metrics: &AggregateMetrics, outcomes: &[TestOutcome]) -> ReadinessVerdict {
    ReadinessPolicy::default().classify(metrics, outcomes)
}

/// Failing outcomes, most severe first, ties kept in execution order.
pub fn issue_list(outcomes: &[TestOutcome]) -> Vec<&TestOutcome> {
    let mut issues: Vec<&TestOutcome> = outcomes.iter().filter(|o| !o.success).collect();
    // sort_by is stable
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    issues
}
