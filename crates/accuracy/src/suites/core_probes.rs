use super::{list_failures, SuiteContext};
use crate::evidence::Evidence;
use crate::outcome::{Criticality, Severity};
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;
use context_verifier::{Language, ReferenceCheck, SymbolClaim, VerificationOutcome};
use std::collections::HashMap;

pub async fn run_core<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    let probes = &ctx.config.core;
    runner.note("Core functionality");

    runner
        .run_case_async(
            &format!("Core: {} definition", probes.definition_symbol),
            definition_check(ctx),
        )
        .await;
    runner
        .run_case_async(
            &format!("Core: {} references", probes.reference_symbol),
            reference_check(ctx),
        )
        .await;
    runner
        .run_case_async(
            &format!("Core: {} subgraph", probes.subgraph_symbol),
            subgraph_check(ctx),
        )
        .await;
}

async fn definition_check(ctx: &SuiteContext<'_>) -> CheckResult {
    let probes = &ctx.config.core;
    let symbol = probes.definition_symbol.as_str();
    let definitions = match ctx.client.find_definitions(symbol).await {
        Ok(definitions) => definitions,
        Err(err) => return CheckResult::adapter_failure(Criticality::Foundational, err),
    };

    let hint = probes.definition_file_hint.as_str();
    let Some(definition) = definitions
        .iter()
        .find(|d| hint.is_empty() || d.file_path.contains(hint))
    else {
        let location = if hint.is_empty() {
            String::new()
        } else {
            format!(" in {hint}")
        };
        return CheckResult::fail(
            format!(
                "{symbol} definition not found{location} ({} candidates)",
                definitions.len()
            ),
            Severity::Critical,
        );
    };

    let claim = SymbolClaim::new(
        definition.file_path.clone(),
        symbol,
        probes.definition_kind.clone(),
        definition.start_line,
        definition.end_line,
    );
    let outcome = match ctx.read_source(&definition.file_path) {
        Some(content) => ctx.verifier.verify(&content, &claim),
        None => VerificationOutcome::unreadable(&definition.file_path),
    };
    let details = format!(
        "{}:{}-{} ({})",
        definition.file_path, definition.start_line, definition.end_line, outcome.reason
    );

    let mut evidence = Evidence::new();
    let language = Language::from_path(&definition.file_path);
    if evidence.record_claim(language, claim, outcome) {
        CheckResult::pass(details).with_evidence(evidence)
    } else {
        CheckResult::fail(details, Severity::Critical).with_evidence(evidence)
    }
}

async fn reference_check(ctx: &SuiteContext<'_>) -> CheckResult {
    let symbol = ctx.config.core.reference_symbol.as_str();
    let references = match ctx.client.find_references(symbol).await {
        Ok(references) => references,
        Err(err) => return CheckResult::adapter_failure(Criticality::Foundational, err),
    };
    if references.is_empty() {
        return CheckResult::fail(format!("no references to {symbol} found"), Severity::Critical);
    }

    let mut sources: HashMap<&str, Option<String>> = HashMap::new();
    let mut mismatches = Vec::new();
    for reference in &references {
        let content = sources
            .entry(reference.file_path.as_str())
            .or_insert_with(|| ctx.read_source(&reference.file_path));
        let check = match content.as_deref() {
            Some(content) => ctx.verifier.verify_reference(content, reference.line, symbol),
            None => ReferenceCheck::LineOutOfBounds,
        };
        if check != ReferenceCheck::Confirmed {
            mismatches.push(format!("{}:{}", reference.file_path, reference.line));
        }
    }

    let confirmed = references.len() - mismatches.len();
    let details = format!("{confirmed}/{} references confirmed", references.len());
    if mismatches.is_empty() {
        CheckResult::pass(details)
    } else {
        CheckResult::fail(
            format!("{details}; mismatched: {}", list_failures(&mismatches)),
            Severity::Critical,
        )
    }
}

async fn subgraph_check(ctx: &SuiteContext<'_>) -> CheckResult {
    let probes = &ctx.config.core;
    let symbol = probes.subgraph_symbol.as_str();
    let graph = match ctx.client.symbol_subgraph(symbol, probes.subgraph_depth).await {
        Ok(graph) => graph,
        Err(err) => return CheckResult::adapter_failure(Criticality::BestEffort, err),
    };

    let valid_edges = graph.valid_edge_count();
    let has_symbol = graph.has_node_named(symbol);
    let details = format!(
        "nodes: {}, valid edges: {valid_edges}/{}, has {symbol}: {has_symbol}",
        graph.nodes.len(),
        graph.edges.len()
    );
    if has_symbol && valid_edges > 0 && graph.nodes.len() >= 2 {
        CheckResult::pass(details)
    } else {
        CheckResult::fail(details, Severity::Warning)
    }
}
