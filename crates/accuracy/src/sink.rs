use crate::outcome::{Severity, TestOutcome};

/// Destination for per-case reporting, owned by one [`crate::CaseRunner`] for one run.
pub trait ReportSink {
    fn record(&mut self, outcome: &TestOutcome);

    /// Free-form progress note (suite headers and the like).
    fn note(&mut self, _message: &str) {}
}

/// Reports through the `log` facade: passes at info, failures by severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn record(&mut self, outcome: &TestOutcome) {
        if outcome.success {
            log::info!("PASS {}: {}", outcome.name, outcome.details);
            return;
        }
        match outcome.severity {
            Severity::Critical => {
                log::error!("FAIL [CRITICAL] {}: {}", outcome.name, outcome.details)
            }
            Severity::Warning => log::warn!("FAIL [WARNING] {}: {}", outcome.name, outcome.details),
            Severity::Info => log::info!("FAIL {}: {}", outcome.name, outcome.details),
        }
    }

    fn note(&mut self, message: &str) {
        log::info!("{message}");
    }
}

/// Keeps rendered lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, outcome: &TestOutcome) {
        let status = if outcome.success { "PASS" } else { "FAIL" };
        self.lines.push(format!(
            "{status} [{}] {}: {}",
            outcome.severity, outcome.name, outcome.details
        ));
    }

    fn note(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn record(&mut self, _outcome: &TestOutcome) {}
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn record(&mut self, outcome: &TestOutcome) {
        (**self).record(outcome);
    }

    fn note(&mut self, message: &str) {
        (**self).note(message);
    }
}
