use crate::config::SuiteConfig;
use crate::report::RunReport;
use crate::runner::CaseRunner;
use crate::sink::ReportSink;
use crate::suites::{run_all, SuiteContext};
use anyhow::{Context, Result};
use context_backend::BackendClient;
use context_verifier::Verifier;

/// Run every configured suite against `client` and build the report.
///
/// Only configuration problems are errors; backend failures end up as outcomes.
pub async fn run_suite<S: ReportSink>(
    client: &BackendClient,
    config: &SuiteConfig,
    sink: S,
) -> Result<(RunReport, S)> {
    let verifier =
        Verifier::from_config(&config.verifier_config()).context("Invalid verifier settings")?;
    let ctx = SuiteContext::new(client, &verifier, config);
    log::debug!(
        "Running accuracy suites against {} (root {})",
        client.describe(),
        ctx.project_root.display()
    );

    let mut runner = CaseRunner::new(sink);
    run_all(&mut runner, &ctx).await;
    let (log, sink) = runner.finish();

    let report = RunReport::from_log(client.describe(), &log, &config.readiness_policy());
    log::info!(
        "{}: {}/{} passed, {} critical, {} warnings",
        report.verdict.status,
        report.metrics.passed,
        report.metrics.total,
        report.verdict.critical_failures,
        report.verdict.warnings
    );
    Ok((report, sink))
}
