use super::SuiteContext;
use crate::config::LanguageCheck;
use crate::evidence::Evidence;
use crate::outcome::{Criticality, Severity};
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;
use std::collections::HashSet;

pub async fn run_languages<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    if ctx.config.languages.is_empty() {
        return;
    }
    runner.note("Multi-language support");
    for check in &ctx.config.languages {
        let name = format!(
            "Language: {} ({})",
            check.language().display_name(),
            check.file
        );
        runner.run_case_async(&name, language_check(ctx, check)).await;
    }
}

async fn language_check(ctx: &SuiteContext<'_>, check: &LanguageCheck) -> CheckResult {
    let response = match ctx.client.analyze_file(&check.file).await {
        Ok(response) => response,
        Err(err) => return CheckResult::adapter_failure(Criticality::BestEffort, err),
    };

    let language = check.language();
    let content = ctx.read_source(&check.file);
    let mut evidence = Evidence::new();
    let mut verified_names = HashSet::new();
    for symbol in &response.symbols {
        if ctx.verify_symbol(&mut evidence, language, &check.file, content.as_deref(), symbol) {
            verified_names.insert(symbol.name.as_str());
        }
    }

    let reported: HashSet<&str> = response.symbols.iter().map(|s| s.name.as_str()).collect();
    let found_expected = check
        .expected_symbols
        .iter()
        .filter(|name| reported.contains(name.as_str()))
        .count();
    let verified_expected = check
        .expected_symbols
        .iter()
        .filter(|name| verified_names.contains(name.as_str()))
        .count();

    let details = format!(
        "{} symbols, {} verified, expected found {found_expected}/{}, expected verified {verified_expected}",
        response.symbols.len(),
        evidence.claims.iter().filter(|c| c.outcome.verified).count(),
        check.expected_symbols.len()
    );
    let success = if check.expected_symbols.is_empty() {
        !verified_names.is_empty()
    } else {
        verified_expected > 0
    };
    if success {
        CheckResult::pass(details).with_evidence(evidence)
    } else {
        CheckResult::fail(details, Severity::Warning).with_evidence(evidence)
    }
}
