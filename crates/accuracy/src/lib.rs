//! # Context Accuracy
//!
//! Runs named accuracy cases against a code-analysis backend, cross-checks its
//! answers with [`context_verifier`] and turns the run log into a readiness verdict.
//!
//! ```text
//! SuiteConfig ──> suites (connectivity, core, languages, corpus, reliability, skeleton)
//!                   │  each case: BackendClient call → Verifier → CheckResult
//!                   ▼
//!               CaseRunner ──> RunLog (append-only outcomes + evidence)
//!                   │                  │
//!                   ▼                  ▼
//!              ReportSink        aggregate() ──> AggregateMetrics
//!                                                   │
//!                                     ReadinessPolicy::classify ──> READY / MOSTLY_READY / NOT_READY
//! ```
//!
//! Metrics and verdicts are pure projections of the log; recomputing them from the
//! same log always yields the same values.

mod aggregate;
mod config;
mod engine;
mod evidence;
mod outcome;
mod readiness;
mod report;
mod runner;
mod sink;
pub mod suites;

pub use aggregate::{aggregate, aggregate_by_language, percentage, AggregateMetrics, ElementTally, Scope};
pub use config::{
    CoreProbes, CorpusCheck, LanguageCheck, ReliabilityConfig, SkeletonConfig, SkeletonCorpus,
    SuiteConfig, TransportConfig,
};
pub use engine::run_suite;
pub use evidence::{ClaimRecord, ElementObservation, Evidence, LineObservation};
pub use outcome::{Criticality, Severity, TestOutcome};
pub use readiness::{
    classify, issue_list, ReadinessPolicy, ReadinessStatus, ReadinessVerdict,
    DEFAULT_READY_THRESHOLD,
};
pub use report::RunReport;
pub use runner::{CaseRunner, CheckResult, RunLog};
pub use sink::{LogSink, MemorySink, NullSink, ReportSink};
