//! Accuracy suites. Each suite logs its cases into the shared [`CaseRunner`] and
//! always runs every case, whatever earlier cases reported.

mod connectivity;
mod core_probes;
mod corpus;
mod languages;
mod reliability;
mod skeleton;

pub use self::connectivity::run_connectivity;
pub use self::core_probes::run_core;
pub use self::corpus::run_corpus_accuracy;
pub use self::languages::run_languages;
pub use self::reliability::run_reliability;
pub use self::skeleton::run_skeleton_quality;

use crate::config::SuiteConfig;
use crate::evidence::Evidence;
use crate::runner::CaseRunner;
use crate::sink::ReportSink;
use anyhow::{Context, Result};
use context_backend::BackendClient;
use context_protocol::AnalyzedSymbol;
use context_verifier::{Language, SymbolClaim, SymbolKind, VerificationOutcome, Verifier};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Failed files listed in a corpus outcome's details.
const MAX_LISTED_FAILURES: usize = 5;

/// Shared inputs of every suite.
pub struct SuiteContext<'a> {
    pub client: &'a BackendClient,
    pub verifier: &'a Verifier,
    pub config: &'a SuiteConfig,
    pub project_root: PathBuf,
}

impl<'a> SuiteContext<'a> {
    pub fn new(client: &'a BackendClient, verifier: &'a Verifier, config: &'a SuiteConfig) -> Self {
        Self {
            client,
            verifier,
            config,
            project_root: config.project_root(),
        }
    }

    /// Absolute paths stay as they are, relative ones hang off the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.project_root.join(candidate)
        }
    }

    /// Path as sent to the backend: relative to the project root, `/`-separated.
    pub fn backend_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn read_source(&self, path: &str) -> Option<String> {
        let full = self.resolve(path);
        match std::fs::read_to_string(&full) {
            Ok(content) => Some(content),
            Err(err) => {
                log::debug!("Cannot read {}: {err}", full.display());
                None
            }
        }
    }

    /// Verify one analyzed symbol and record the claim. Returns whether it verified.
    pub(crate) fn verify_symbol(
        &self,
        evidence: &mut Evidence,
        language: Language,
        file_path: &str,
        content: Option<&str>,
        symbol: &AnalyzedSymbol,
    ) -> bool {
        let claim = SymbolClaim::new(
            symbol.file_path.as_deref().unwrap_or(file_path),
            symbol.name.clone(),
            SymbolKind::parse(&symbol.symbol_type),
            symbol.start_line,
            symbol.end_line,
        );
        let outcome = match content {
            Some(content) => self.verifier.verify(content, &claim),
            None => VerificationOutcome::unreadable(&claim.file_path),
        };
        if !outcome.verified {
            log::debug!("{} rejected: {}", claim.name, outcome.reason);
        }
        evidence.record_claim(language, claim, outcome)
    }
}

/// Run every suite in order.
pub async fn run_all<S: ReportSink>(runner: &mut CaseRunner<S>, ctx: &SuiteContext<'_>) {
    run_connectivity(runner, ctx).await;
    run_core(runner, ctx).await;
    run_languages(runner, ctx).await;
    run_corpus_accuracy(runner, ctx).await;
    run_reliability(runner, ctx).await;
    run_skeleton_quality(runner, ctx).await;
}

/// Files under `root` with one of `extensions`, sorted for stable reports.
pub fn collect_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let matcher = extension_matcher(extensions)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.is_match(relative) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn extension_matcher(extensions: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let glob = GlobBuilder::new(&format!("**/*.{ext}"))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid extension '{ext}'"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build extension matcher")
}

fn list_failures(failures: &[String]) -> String {
    let mut listed = failures
        .iter()
        .take(MAX_LISTED_FAILURES)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if failures.len() > MAX_LISTED_FAILURES {
        listed.push_str(&format!(" (+{} more)", failures.len() - MAX_LISTED_FAILURES));
    }
    listed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.cs"), "class B {}").unwrap();
        fs::write(dir.path().join("nested/a.CS"), "class A {}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_files(dir.path(), &["cs".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.cs", "nested/a.CS"]);
    }

    #[test]
    fn test_list_failures_truncates() {
        let failures: Vec<String> = (0..7).map(|i| format!("f{i}")).collect();
        assert_eq!(list_failures(&failures), "f0, f1, f2, f3, f4 (+2 more)");
        assert_eq!(list_failures(&failures[..2]), "f0, f1");
    }
}
