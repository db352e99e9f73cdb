use super::SuiteContext;
use crate::outcome::{Criticality, Severity};
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;

pub async fn run_connectivity<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    runner.note("Connectivity");

    runner
        .run_case_async("Connectivity: backend reachable", async {
            match ctx.client.ping().await {
                Ok(()) => CheckResult::pass(format!("{} is responding", ctx.client.describe())),
                Err(err) => CheckResult::fail(
                    format!("cannot connect to {}: {err}", ctx.client.describe()),
                    Severity::Critical,
                ),
            }
        })
        .await;

    runner
        .run_case_async("Connectivity: required tools advertised", async {
            let tools = match ctx.client.list_tools().await {
                Ok(tools) => tools,
                Err(err) => return CheckResult::adapter_failure(Criticality::BestEffort, err),
            };
            let missing: Vec<&str> = ctx
                .config
                .required_tools
                .iter()
                .filter(|required| !tools.iter().any(|tool| tool == *required))
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                CheckResult::pass(format!("{} tools advertised", tools.len()))
            } else {
                CheckResult::fail(format!("missing tools: {}", missing.join(", ")), Severity::Warning)
            }
        })
        .await;
}
