use crate::evidence::Evidence;
use crate::outcome::TestOutcome;
use context_verifier::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `numerator / denominator * 100`, or 0 for an empty denominator.
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 * 100.0 / denominator as f64
}

/// Raw counts for one structural element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTally {
    pub found: usize,
    pub expected: usize,
}

impl ElementTally {
    /// Expected count is floored at 1, so over-reporting yields values above 100.
    pub fn preservation(&self) -> f64 {
        percentage(self.found, self.expected.max(1))
    }
}

/// Which evidence an aggregation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Run,
    File(String),
    Language(Language),
}

impl Scope {
    fn covers(&self, language: Language, file_path: &str) -> bool {
        match self {
            Scope::Run => true,
            Scope::File(path) => path == file_path,
            Scope::Language(lang) => *lang == language,
        }
    }
}

/// Derived metrics. Percentages are always recomputed from the tallies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub verified_symbols: usize,
    pub total_symbols: usize,
    pub symbol_accuracy: f64,
    pub elements: BTreeMap<String, ElementTally>,
    pub element_preservation: BTreeMap<String, f64>,
    pub original_lines: usize,
    pub skeleton_lines: usize,
    pub compression_ratio: f64,
    pub line_refs: usize,
}

impl AggregateMetrics {
    fn recompute(mut self) -> Self {
        self.total = self.passed + self.failed;
        self.success_rate = percentage(self.passed, self.total);
        self.symbol_accuracy = percentage(self.verified_symbols, self.total_symbols);
        self.element_preservation = self
            .elements
            .iter()
            .map(|(name, tally)| (name.clone(), tally.preservation()))
            .collect();
        self.compression_ratio = percentage(self.skeleton_lines, self.original_lines);
        self
    }

    /// Add the tallies of two aggregations and recompute every ratio.
    #[must_use]
    pub fn merge(&self, other: &AggregateMetrics) -> AggregateMetrics {
        let mut elements = self.elements.clone();
        for (name, tally) in &other.elements {
            let entry = elements.entry(name.clone()).or_default();
            entry.found += tally.found;
            entry.expected += tally.expected;
        }
        AggregateMetrics {
            passed: self.passed + other.passed,
            failed: self.failed + other.failed,
            verified_symbols: self.verified_symbols + other.verified_symbols,
            total_symbols: self.total_symbols + other.total_symbols,
            elements,
            original_lines: self.original_lines + other.original_lines,
            skeleton_lines: self.skeleton_lines + other.skeleton_lines,
            line_refs: self.line_refs + other.line_refs,
            ..AggregateMetrics::default()
        }
        .recompute()
    }
}

/// Pure projection of outcomes and evidence onto metrics.
///
/// Outcome counts always cover the whole `outcomes` slice; `scope` only filters
/// the evidence.
pub fn aggregate(outcomes: &[TestOutcome], evidence: &Evidence, scope: &Scope) -> AggregateMetrics {
    let passed = outcomes.iter().filter(|o| o.success).count();
    let mut metrics = AggregateMetrics {
        passed,
        failed: outcomes.len() - passed,
        ..AggregateMetrics::default()
    };

    for record in evidence
        .claims
        .iter()
        .filter(|r| scope.covers(r.language, &r.claim.file_path))
    {
        metrics.total_symbols += 1;
        if record.outcome.verified {
            metrics.verified_symbols += 1;
        }
    }

    for observation in evidence
        .elements
        .iter()
        .filter(|e| scope.covers(e.language, &e.file_path))
    {
        let tally = metrics.elements.entry(observation.element.clone()).or_default();
        tally.found += observation.found;
        tally.expected += observation.expected;
    }

    for observation in evidence
        .lines
        .iter()
        .filter(|l| scope.covers(l.language, &l.file_path))
    {
        metrics.original_lines += observation.original_lines;
        metrics.skeleton_lines += observation.skeleton_lines;
        metrics.line_refs += observation.line_refs;
    }

    metrics.recompute()
}

/// One aggregation per language seen in the evidence, keyed by display name.
pub fn aggregate_by_language(
    outcomes: &[TestOutcome],
    evidence: &Evidence,
) -> BTreeMap<String, AggregateMetrics> {
    let mut languages: Vec<Language> = evidence.languages().collect();
    languages.sort();
    languages.dedup();
    languages
        .into_iter()
        .map(|language| {
            (
                language.display_name().to_string(),
                aggregate(outcomes, evidence, &Scope::Language(language)),
            )
        })
        .collect()
}
