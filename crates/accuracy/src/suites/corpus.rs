use super::{collect_files, list_failures, SuiteContext};
use crate::aggregate::percentage;
use crate::config::CorpusCheck;
use crate::evidence::Evidence;
use crate::outcome::Severity;
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;

pub async fn run_corpus_accuracy<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    if ctx.config.corpora.is_empty() {
        return;
    }
    runner.note("Corpus accuracy");
    for corpus in &ctx.config.corpora {
        let name = format!(
            "Corpus: {} accuracy ({})",
            corpus.language().display_name(),
            corpus.root
        );
        runner.run_case_async(&name, corpus_check(ctx, corpus)).await;
    }
}

/// One aggregate outcome per corpus; per-file failures only show up in the details.
/// A file fails when analysis errors or none of its symbols verify.
async fn corpus_check(ctx: &SuiteContext<'_>, corpus: &CorpusCheck) -> CheckResult {
    let root = ctx.resolve(&corpus.root);
    if !root.is_dir() {
        return CheckResult::fail(
            format!("corpus directory not found: {}", root.display()),
            Severity::Critical,
        );
    }
    let extensions = corpus.extensions();
    let files = match collect_files(&root, &extensions) {
        Ok(files) => files,
        Err(err) => return CheckResult::fail(format!("{err:#}"), Severity::Warning),
    };
    if files.is_empty() {
        return CheckResult::fail(
            format!("no .{} files under {}", extensions.join("/."), root.display()),
            Severity::Warning,
        );
    }

    let language = corpus.language();
    let mut evidence = Evidence::new();
    let mut failed_files = Vec::new();
    for file in &files {
        let path = ctx.backend_path(file);
        let response = match ctx.client.analyze_file(&path).await {
            Ok(response) => response,
            Err(err) => {
                log::debug!("Analysis of {path} failed: {err}");
                failed_files.push(path);
                continue;
            }
        };
        let content = std::fs::read_to_string(file).ok();
        let mut file_verified = 0;
        for symbol in &response.symbols {
            if ctx.verify_symbol(&mut evidence, language, &path, content.as_deref(), symbol) {
                file_verified += 1;
            }
        }
        // A file only counts once at least one of its symbols checks out
        if file_verified == 0 {
            failed_files.push(format!("{path} ({file_verified}/{})", response.symbols.len()));
        }
    }

    let succeeded = files.len() - failed_files.len();
    let file_rate = percentage(succeeded, files.len());
    let verified = evidence.claims.iter().filter(|c| c.outcome.verified).count();
    let symbol_accuracy = percentage(verified, evidence.claims.len());

    let mut details = format!(
        "files {succeeded}/{} ({file_rate:.1}%), symbols verified {verified}/{} ({symbol_accuracy:.1}%)",
        files.len(),
        evidence.claims.len()
    );
    if !failed_files.is_empty() {
        details.push_str(&format!("; failed files: {}", list_failures(&failed_files)));
    }

    if file_rate >= corpus.min_file_success_rate && symbol_accuracy >= corpus.min_symbol_accuracy {
        CheckResult::pass(details).with_evidence(evidence)
    } else {
        CheckResult::fail(details, Severity::Warning).with_evidence(evidence)
    }
}
