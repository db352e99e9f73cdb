use anyhow::{anyhow, bail, Context, Result};
use context_backend::ClientConfig;
use context_protocol::BackendOperation;
use context_verifier::{FallbackPolicy, Language, SymbolKind, VerifierConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::readiness::{ReadinessPolicy, DEFAULT_READY_THRESHOLD};

/// How to reach the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Http {
        url: String,
    },
    ChildProcess {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Recorded responses, no live backend
    Replay {
        path: PathBuf,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Http {
            url: "http://localhost:3000".to_string(),
        }
    }
}

/// Probes for the core definition/reference/subgraph checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreProbes {
    pub definition_symbol: String,
    /// Substring the definition's file path must contain; empty accepts the first
    pub definition_file_hint: String,
    pub definition_kind: SymbolKind,
    pub reference_symbol: String,
    pub subgraph_symbol: String,
    pub subgraph_depth: usize,
}

impl Default for CoreProbes {
    fn default() -> Self {
        Self {
            definition_symbol: "Config".to_string(),
            definition_file_hint: "config.rs".to_string(),
            definition_kind: SymbolKind::Class,
            reference_symbol: "load_config_as_toml".to_string(),
            subgraph_symbol: "Config".to_string(),
            subgraph_depth: 1,
        }
    }
}

/// One file whose analysis must surface the listed symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCheck {
    pub language: String,
    pub file: String,
    #[serde(default)]
    pub expected_symbols: Vec<String>,
}

impl LanguageCheck {
    pub fn language(&self) -> Language {
        resolve_language(&self.language, Some(&self.file))
    }
}

/// A directory of sample files analyzed as one corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusCheck {
    pub language: String,
    pub root: String,
    /// Empty means the language's default extensions
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default = "default_min_file_success_rate")]
    pub min_file_success_rate: f64,
    #[serde(default = "default_min_symbol_accuracy")]
    pub min_symbol_accuracy: f64,
}

fn default_min_file_success_rate() -> f64 {
    70.0
}

fn default_min_symbol_accuracy() -> f64 {
    10.0
}

impl CorpusCheck {
    pub fn language(&self) -> Language {
        resolve_language(&self.language, None)
    }

    pub fn extensions(&self) -> Vec<String> {
        extensions_or_default(&self.extensions, self.language())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityConfig {
    /// File timed for the response-time check; skipped when unset
    pub probe_file: Option<String>,
    pub large_file: Option<String>,
    pub missing_file: String,
    pub max_response_ms: u64,
    pub warn_response_ms: u64,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            probe_file: None,
            large_file: None,
            missing_file: "nonexistent/file.rs".to_string(),
            max_response_ms: 5_000,
            warn_response_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonCorpus {
    pub language: String,
    pub root: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl SkeletonCorpus {
    pub fn language(&self) -> Language {
        resolve_language(&self.language, None)
    }

    pub fn extensions(&self) -> Vec<String> {
        extensions_or_default(&self.extensions, self.language())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    pub max_tokens: usize,
    pub min_preservation: f64,
    pub corpora: Vec<SkeletonCorpus>,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4_000,
            min_preservation: 50.0,
            corpora: Vec::new(),
        }
    }
}

/// Everything one accuracy run needs besides the backend itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base for relative paths; defaults to the current directory
    pub project_root: Option<PathBuf>,
    pub transport: TransportConfig,
    pub call_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub fallback_policy: FallbackPolicy,
    pub extra_patterns: BTreeMap<String, Vec<String>>,
    pub ready_threshold: f64,
    pub required_tools: Vec<String>,
    pub core: CoreProbes,
    pub languages: Vec<LanguageCheck>,
    pub corpora: Vec<CorpusCheck>,
    pub reliability: ReliabilityConfig,
    pub skeleton: SkeletonConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            project_root: None,
            transport: TransportConfig::default(),
            call_timeout_ms: client.call_timeout_ms,
            connect_timeout_ms: client.connect_timeout_ms,
            fallback_policy: FallbackPolicy::default(),
            extra_patterns: BTreeMap::new(),
            ready_threshold: DEFAULT_READY_THRESHOLD,
            required_tools: BackendOperation::ALL
                .iter()
                .map(|op| op.as_str().to_string())
                .collect(),
            core: CoreProbes::default(),
            languages: Vec::new(),
            corpora: Vec::new(),
            reliability: ReliabilityConfig::default(),
            skeleton: SkeletonConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse JSON, falling back to TOML.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 =
                    std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
                })?;
                serde_json::to_value(toml_value)
                    .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
            }
        };
        let config: SuiteConfig =
            serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_ms == 0 {
            bail!("call_timeout_ms must be positive");
        }
        if self.connect_timeout_ms == 0 {
            bail!("connect_timeout_ms must be positive");
        }
        if !(0.0..=100.0).contains(&self.ready_threshold) {
            bail!("ready_threshold must be within 0..=100, got {}", self.ready_threshold);
        }
        if self.reliability.warn_response_ms > self.reliability.max_response_ms {
            bail!(
                "reliability.warn_response_ms ({}) exceeds max_response_ms ({})",
                self.reliability.warn_response_ms,
                self.reliability.max_response_ms
            );
        }
        if self.skeleton.max_tokens == 0 {
            bail!("skeleton.max_tokens must be positive");
        }
        for check in &self.languages {
            if check.language() == Language::Unknown {
                bail!("Unknown language '{}' for {}", check.language, check.file);
            }
        }
        for corpus in &self.corpora {
            if corpus.language() == Language::Unknown {
                bail!("Unknown corpus language '{}'", corpus.language);
            }
            for threshold in [corpus.min_file_success_rate, corpus.min_symbol_accuracy] {
                if !(0.0..=100.0).contains(&threshold) {
                    bail!("Corpus '{}' threshold {threshold} outside 0..=100", corpus.root);
                }
            }
        }
        for corpus in &self.skeleton.corpora {
            if corpus.language() == Language::Unknown {
                bail!("Unknown skeleton corpus language '{}'", corpus.language);
            }
        }
        // Surface bad pattern templates at load time rather than mid-run
        context_verifier::Verifier::from_config(&self.verifier_config())
            .map_err(|err| anyhow!("extra_patterns: {err}"))?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            call_timeout_ms: self.call_timeout_ms,
            connect_timeout_ms: self.connect_timeout_ms,
        }
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            fallback_policy: self.fallback_policy,
            extra_patterns: self.extra_patterns.clone(),
        }
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy::new(self.ready_threshold)
    }

    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn resolve_language(name: &str, file: Option<&str>) -> Language {
    match Language::from_name(name) {
        Language::Unknown => file.map(Language::from_path).unwrap_or(Language::Unknown),
        language => language,
    }
}

fn extensions_or_default(extensions: &[String], language: Language) -> Vec<String> {
    if extensions.is_empty() {
        return language
            .default_extensions()
            .iter()
            .map(|ext| ext.to_string())
            .collect();
    }
    extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = SuiteConfig::from_bytes(b"{}").unwrap();
        assert_eq!(config, SuiteConfig::default());
        assert_eq!(config.required_tools.len(), 5);
        assert_eq!(config.core.reference_symbol, "load_config_as_toml");
    }

    #[test]
    fn test_toml_fallback() {
        let raw = r#"
project_root = "/work/codex-rs"
fallback_policy = "reject"
ready_threshold = 90

[transport]
kind = "child_process"
command = "mcp-server"
args = ["--stdio"]

[[corpora]]
language = "C#"
root = "tests/csharp"

[reliability]
probe_file = "core/src/config.rs"
"#;
        let config = SuiteConfig::from_bytes(raw.as_bytes()).unwrap();
        assert_eq!(config.fallback_policy, FallbackPolicy::Reject);
        assert_eq!(config.ready_threshold, 90.0);
        assert_eq!(
            config.transport,
            TransportConfig::ChildProcess {
                command: "mcp-server".into(),
                args: vec!["--stdio".into()],
            }
        );
        assert_eq!(config.corpora[0].language(), Language::CSharp);
        assert_eq!(config.corpora[0].min_file_success_rate, 70.0);
        assert_eq!(config.corpora[0].extensions(), vec!["cs".to_string()]);
        assert_eq!(config.reliability.max_response_ms, 5_000);
    }

    #[test]
    fn test_rejects_bad_threshold_and_unknown_language() {
        assert!(SuiteConfig::from_bytes(br#"{"ready_threshold": 120}"#).is_err());
        assert!(SuiteConfig::from_bytes(
            br#"{"languages": [{"language": "cobol", "file": "a.cob"}]}"#
        )
        .is_err());
    }

    #[test]
    fn test_rejects_pattern_without_placeholder() {
        let err = SuiteConfig::from_bytes(br#"{"extra_patterns": {"class": ["\\bdata\\s+"]}}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("extra_patterns"));
    }

    #[test]
    fn test_language_inferred_from_file_when_name_unknown() {
        let check = LanguageCheck {
            language: "typescript-react".into(),
            file: "ui/App.tsx".into(),
            expected_symbols: vec![],
        };
        assert_eq!(check.language(), Language::TypeScript);
    }
}
