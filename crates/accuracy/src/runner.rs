use crate::evidence::Evidence;
use crate::outcome::{Criticality, Severity, TestOutcome};
use crate::sink::ReportSink;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

/// What a case check returns: verdict, diagnostics and the evidence it gathered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub success: bool,
    pub details: String,
    pub severity: Severity,
    pub evidence: Evidence,
}

impl CheckResult {
    pub fn new(success: bool, details: impl Into<String>, severity: Severity) -> Self {
        Self {
            success,
            details: details.into(),
            severity,
            evidence: Evidence::default(),
        }
    }

    pub fn pass(details: impl Into<String>) -> Self {
        Self::new(true, details, Severity::Info)
    }

    pub fn fail(details: impl Into<String>, severity: Severity) -> Self {
        Self::new(false, details, severity)
    }

    /// Failure to obtain backend data, graded by the case's criticality.
    pub fn adapter_failure(criticality: Criticality, error: impl Display) -> Self {
        Self::fail(format!("adapter failure: {error}"), criticality.severity())
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Ordered, append-only record of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    outcomes: Vec<TestOutcome>,
    passed: usize,
    failed: usize,
    evidence: Evidence,
}

impl RunLog {
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn append(&mut self, outcome: TestOutcome) -> &TestOutcome {
        if outcome.success {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
        &self.outcomes[self.outcomes.len() - 1]
    }
}

/// Executes named cases sequentially and owns the run log plus the reporting sink.
///
/// A failing case never stops the next one; every case appends exactly one
/// [`TestOutcome`].
pub struct CaseRunner<S: ReportSink> {
    log: RunLog,
    names: HashSet<String>,
    sink: S,
}

impl<S: ReportSink> CaseRunner<S> {
    pub fn new(sink: S) -> Self {
        Self {
            log: RunLog::default(),
            names: HashSet::new(),
            sink,
        }
    }

    pub fn run_case<F>(&mut self, name: &str, check: F) -> &TestOutcome
    where
        F: FnOnce() -> CheckResult,
    {
        let result = check();
        self.record(name, result)
    }

    pub async fn run_case_async<Fut>(&mut self, name: &str, check: Fut) -> &TestOutcome
    where
        Fut: Future<Output = CheckResult>,
    {
        let result = check.await;
        self.record(name, result)
    }

    /// Append `outcome` to the run log and report it.
    pub fn log(&mut self, outcome: TestOutcome) -> &TestOutcome {
        if !self.names.insert(outcome.name.clone()) {
            log::warn!("Duplicate case name in run log: {}", outcome.name);
        }
        self.sink.record(&outcome);
        self.log.append(outcome)
    }

    pub fn note(&mut self, message: &str) {
        self.sink.note(message);
    }

    fn record(&mut self, name: &str, result: CheckResult) -> &TestOutcome {
        let CheckResult {
            success,
            details,
            severity,
            evidence,
        } = result;
        self.log.evidence.absorb(evidence);
        self.log(TestOutcome::new(name, success, details, severity))
    }

    /// Read-only snapshot of the log so far.
    pub fn snapshot(&self) -> &RunLog {
        &self.log
    }

    pub fn into_log(self) -> RunLog {
        self.log
    }

    pub fn finish(self) -> (RunLog, S) {
        (self.log, self.sink)
    }
}
