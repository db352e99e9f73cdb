use crate::aggregate::{aggregate, aggregate_by_language, AggregateMetrics, Scope};
use crate::outcome::TestOutcome;
use crate::readiness::{issue_list, ReadinessPolicy, ReadinessStatus, ReadinessVerdict};
use crate::runner::RunLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a finished run produced, ready for rendering or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub backend: String,
    pub verdict: ReadinessVerdict,
    pub metrics: AggregateMetrics,
    pub per_language: BTreeMap<String, AggregateMetrics>,
    /// Failing outcomes, most severe first
    pub issues: Vec<TestOutcome>,
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    pub fn from_log(backend: impl Into<String>, log: &RunLog, policy: &ReadinessPolicy) -> Self {
        let metrics = aggregate(log.outcomes(), log.evidence(), &Scope::Run);
        let verdict = policy.classify(&metrics, log.outcomes());
        Self {
            backend: backend.into(),
            verdict,
            per_language: aggregate_by_language(log.outcomes(), log.evidence()),
            issues: issue_list(log.outcomes()).into_iter().cloned().collect(),
            outcomes: log.outcomes().to_vec(),
            metrics,
        }
    }

    pub fn status(&self) -> ReadinessStatus {
        self.verdict.status
    }

    pub fn render_text(&self) -> String {
        let m = &self.metrics;
        let mut out = String::new();
        out.push_str(&format!("Accuracy report for {}\n", self.backend));
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out.push_str(&format!("Total tests:       {}\n", m.total));
        out.push_str(&format!("Passed:            {}\n", m.passed));
        out.push_str(&format!("Failed:            {}\n", m.failed));
        out.push_str(&format!("Success rate:      {:.1}%\n", m.success_rate));
        out.push_str(&format!("Critical failures: {}\n", self.verdict.critical_failures));
        out.push_str(&format!("Warnings:          {}\n", self.verdict.warnings));
        if m.total_symbols > 0 {
            out.push_str(&format!(
                "Symbol accuracy:   {:.1}% ({}/{})\n",
                m.symbol_accuracy, m.verified_symbols, m.total_symbols
            ));
        }
        if m.original_lines > 0 {
            out.push_str(&format!("Compression:       {:.1}%\n", m.compression_ratio));
        }

        if !self.per_language.is_empty() {
            out.push_str("\nPer language:\n");
            for (language, metrics) in &self.per_language {
                out.push_str(&format!("  {language:<12} {}\n", language_summary(metrics)));
            }
        }

        out.push_str(&format!("\nStatus: {}\n", status_line(self.verdict.status)));

        if !self.issues.is_empty() {
            out.push_str("\nIssues:\n");
            for issue in &self.issues {
                out.push_str(&format!(
                    "  [{}] {}: {}\n",
                    issue.severity, issue.name, issue.details
                ));
            }
        }
        out
    }

    pub fn render_markdown(&self) -> String {
        let m = &self.metrics;
        let mut md = String::new();
        md.push_str("# Accuracy report\n\n");
        md.push_str(&format!("- Backend: `{}`\n", self.backend));
        md.push_str(&format!("- Status: **{}**\n", self.verdict.status));
        md.push_str(&format!(
            "- Cases: `{}` passed / `{}` total (`{:.1}%`)\n",
            m.passed, m.total, m.success_rate
        ));
        md.push_str(&format!(
            "- Critical failures: `{}`, warnings: `{}`\n\n",
            self.verdict.critical_failures, self.verdict.warnings
        ));

        if !self.per_language.is_empty() {
            md.push_str("## Languages\n\n");
            md.push_str("| language | symbols | verified | accuracy | compression | preservation |\n");
            md.push_str("|---|---:|---:|---:|---:|---|\n");
            for (language, metrics) in &self.per_language {
                md.push_str(&format!(
                    "| {} | `{}` | `{}` | `{:.1}%` | `{:.1}%` | {} |\n",
                    language,
                    metrics.total_symbols,
                    metrics.verified_symbols,
                    metrics.symbol_accuracy,
                    metrics.compression_ratio,
                    preservation_summary(metrics)
                ));
            }
            md.push('\n');
        }

        md.push_str("## Cases\n\n");
        md.push_str("| case | result | severity | details |\n");
        md.push_str("|---|---|---|---|\n");
        for outcome in &self.outcomes {
            md.push_str(&format!(
                "| {} | {} | `{}` | {} |\n",
                escape_cell(&outcome.name),
                if outcome.success { "pass" } else { "**fail**" },
                outcome.severity,
                escape_cell(&outcome.details)
            ));
        }
        md.push('\n');

        if !self.issues.is_empty() {
            md.push_str("## Issues\n\n");
            for issue in &self.issues {
                md.push_str(&format!(
                    "- `{}` {}: {}\n",
                    issue.severity, issue.name, issue.details
                ));
            }
            md.push('\n');
        }
        md
    }
}

fn status_line(status: ReadinessStatus) -> &'static str {
    match status {
        ReadinessStatus::Ready => "READY, backend results can be trusted",
        ReadinessStatus::MostlyReady => "MOSTLY_READY, no critical failures but some checks failed",
        ReadinessStatus::NotReady => "NOT_READY, critical failures must be fixed first",
    }
}

fn language_summary(metrics: &AggregateMetrics) -> String {
    let mut parts = Vec::new();
    if metrics.total_symbols > 0 {
        parts.push(format!(
            "symbols {}/{} ({:.1}%)",
            metrics.verified_symbols, metrics.total_symbols, metrics.symbol_accuracy
        ));
    }
    if metrics.original_lines > 0 {
        parts.push(format!("compression {:.1}%", metrics.compression_ratio));
    }
    if metrics.line_refs > 0 {
        parts.push(format!("line refs {}", metrics.line_refs));
    }
    if !metrics.element_preservation.is_empty() {
        parts.push(format!("preservation {}", preservation_summary(metrics)));
    }
    parts.join(", ")
}

fn preservation_summary(metrics: &AggregateMetrics) -> String {
    if metrics.element_preservation.is_empty() {
        return "n/a".to_string();
    }
    metrics
        .element_preservation
        .iter()
        .map(|(element, value)| format!("{element} {value:.0}%"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
