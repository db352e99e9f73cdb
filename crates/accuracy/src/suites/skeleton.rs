use super::{collect_files, list_failures, SuiteContext};
use crate::aggregate::{aggregate, Scope};
use crate::config::SkeletonCorpus;
use crate::evidence::{ElementObservation, Evidence, LineObservation};
use crate::outcome::Severity;
use crate::runner::{CaseRunner, CheckResult};
use crate::sink::ReportSink;
use context_verifier::{count_elements, count_line_refs};

pub async fn run_skeleton_quality<S: ReportSink>(
    runner: &mut CaseRunner<S>,
    ctx: &SuiteContext<'_>,
) {
    if ctx.config.skeleton.corpora.is_empty() {
        return;
    }
    runner.note("Skeleton quality");
    for corpus in &ctx.config.skeleton.corpora {
        let name = format!(
            "Skeleton: {} quality ({})",
            corpus.language().display_name(),
            corpus.root
        );
        runner.run_case_async(&name, skeleton_check(ctx, corpus)).await;
    }
}

async fn skeleton_check(ctx: &SuiteContext<'_>, corpus: &SkeletonCorpus) -> CheckResult {
    let settings = &ctx.config.skeleton;
    let root = ctx.resolve(&corpus.root);
    if !root.is_dir() {
        return CheckResult::fail(
            format!("skeleton corpus not found: {}", root.display()),
            Severity::Warning,
        );
    }
    let files = match collect_files(&root, &corpus.extensions()) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            return CheckResult::fail(
                format!("no source files under {}", root.display()),
                Severity::Warning,
            )
        }
        Err(err) => return CheckResult::fail(format!("{err:#}"), Severity::Warning),
    };

    let language = corpus.language();
    let mut evidence = Evidence::new();
    let mut failed_files = Vec::new();
    for file in &files {
        let path = ctx.backend_path(file);
        let Ok(original) = std::fs::read_to_string(file) else {
            failed_files.push(path);
            continue;
        };
        let bundle = match ctx
            .client
            .skeletons(std::slice::from_ref(&path), settings.max_tokens)
            .await
        {
            Ok(bundle) => bundle,
            Err(err) => {
                log::debug!("Skeleton for {path} failed: {err}");
                failed_files.push(path);
                continue;
            }
        };
        let Some(skeleton) = bundle
            .files
            .iter()
            .find(|f| f.file_path == path)
            .or_else(|| bundle.files.first())
            .filter(|f| !f.skeleton.trim().is_empty())
        else {
            failed_files.push(path);
            continue;
        };

        let produced = count_elements(language, &skeleton.skeleton);
        for (element, expected) in count_elements(language, &original) {
            evidence.record_elements(ElementObservation {
                language,
                file_path: path.clone(),
                element: element.to_string(),
                found: produced.get(element).copied().unwrap_or(0),
                expected,
            });
        }
        evidence.record_lines(LineObservation {
            language,
            file_path: path,
            original_lines: original.lines().count(),
            skeleton_lines: skeleton.skeleton.lines().count(),
            line_refs: count_line_refs(&skeleton.skeleton),
        });
    }

    let metrics = aggregate(&[], &evidence, &Scope::Run);
    // Elements absent from every original cannot be lost, so they are not judged
    let weak: Vec<String> = metrics
        .elements
        .iter()
        .filter(|(_, tally)| tally.expected > 0)
        .filter(|(_, tally)| tally.preservation() < settings.min_preservation)
        .map(|(element, tally)| format!("{element} {:.1}%", tally.preservation()))
        .collect();
    let preserved = metrics
        .element_preservation
        .iter()
        .map(|(element, value)| format!("{element} {value:.1}%"))
        .collect::<Vec<_>>()
        .join(", ");

    let succeeded = files.len() - failed_files.len();
    let mut details = format!(
        "skeletons {succeeded}/{}, compression {:.1}%, line refs {}, preservation: {}",
        files.len(),
        metrics.compression_ratio,
        metrics.line_refs,
        if preserved.is_empty() { "n/a" } else { preserved.as_str() }
    );
    if !failed_files.is_empty() {
        details.push_str(&format!("; failed files: {}", list_failures(&failed_files)));
    }
    if !weak.is_empty() {
        details.push_str(&format!("; below {:.0}%: {}", settings.min_preservation, weak.join(", ")));
    }

    if failed_files.is_empty() && weak.is_empty() {
        CheckResult::pass(details).with_evidence(evidence)
    } else {
        CheckResult::fail(details, Severity::Warning).with_evidence(evidence)
    }
}
