use super::SuiteContext;
use crate::outcome::{Criticality, Severity};
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;
use tokio::time::Instant;

pub async fn run_reliability<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    let reliability = &ctx.config.reliability;
    runner.note("Reliability");

    if let Some(probe) = reliability.probe_file.as_deref() {
        runner
            .run_case_async("Performance: response time", response_time_check(ctx, probe))
            .await;
    } else {
        log::debug!("No reliability.probe_file configured, skipping response time check");
    }

    runner
        .run_case_async("Reliability: error handling", error_handling_check(ctx))
        .await;

    if let Some(large) = reliability.large_file.as_deref() {
        runner
            .run_case_async("Reliability: large file handling", large_file_check(ctx, large))
            .await;
    }
}

async fn response_time_check(ctx: &SuiteContext<'_>, probe: &str) -> CheckResult {
    let limits = &ctx.config.reliability;
    let started = Instant::now();
    let result = ctx.client.analyze_file(probe).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Err(err) = result {
        return CheckResult::fail(
            format!("analysis of {probe} failed after {elapsed_ms}ms: {err}"),
            Severity::Warning,
        );
    }
    let severity = if elapsed_ms > limits.warn_response_ms {
        Severity::Warning
    } else {
        Severity::Info
    };
    CheckResult::new(
        elapsed_ms <= limits.max_response_ms,
        format!(
            "{elapsed_ms}ms for {probe} (limit {}ms)",
            limits.max_response_ms
        ),
        severity,
    )
}

async fn error_handling_check(ctx: &SuiteContext<'_>) -> CheckResult {
    let missing = ctx.config.reliability.missing_file.as_str();
    match ctx.client.analyze_file(missing).await {
        Err(err) if err.is_unreachable() => {
            CheckResult::adapter_failure(Criticality::BestEffort, err)
        }
        Err(err) => CheckResult::pass(format!("missing file rejected: {err}")),
        Ok(response) => CheckResult::fail(
            format!(
                "backend accepted missing file {missing} ({} symbols)",
                response.symbols.len()
            ),
            Severity::Warning,
        ),
    }
}

async fn large_file_check(ctx: &SuiteContext<'_>, path: &str) -> CheckResult {
    match ctx.client.analyze_file(path).await {
        Ok(response) if !response.symbols.is_empty() => {
            CheckResult::pass(format!("{} symbols in {path}", response.symbols.len()))
        }
        Ok(_) => CheckResult::fail(format!("no symbols reported for {path}"), Severity::Warning),
        Err(err) => CheckResult::adapter_failure(Criticality::BestEffort, err),
    }
}
