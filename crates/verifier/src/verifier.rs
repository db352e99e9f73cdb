use crate::error::{Result, VerifierError};
use crate::kind::SymbolKind;
use crate::patterns::PatternSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Backend-reported symbol location awaiting an independent check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolClaim {
    pub file_path: String,
    pub name: String,
    pub kind: SymbolKind,
    /// 1-based, inclusive
    pub start_line: usize,
    pub end_line: usize,
}

impl SymbolClaim {
    pub fn new(
        file_path: impl Into<String>,
        name: impl Into<String>,
        kind: SymbolKind,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            name: name.into(),
            kind,
            start_line,
            end_line,
        }
    }
}

/// What to conclude when the name is in range but no declaration pattern matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Treat the name as weak positive evidence
    #[default]
    AcceptNamePresent,
    /// Require a recognized declaration shape
    Reject,
}

impl FromStr for FallbackPolicy {
    type Err = VerifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accept" | "accept_name_present" => Ok(Self::AcceptNamePresent),
            "reject" | "strict" => Ok(Self::Reject),
            other => Err(VerifierError::UnknownFallbackPolicy(other.to_string())),
        }
    }
}

/// Why a claim was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationReason {
    /// Claimed range falls outside the file
    RangeOutOfBounds {
        start_line: usize,
        end_line: usize,
        line_count: usize,
    },
    EmptyName,
    NameNotFound { name: String },
    PatternMatched { kind: String, pattern: String },
    FallbackAccepted,
    PatternNotMatched { kind: String },
    /// Claimed file could not be read
    SourceUnavailable { file_path: String },
}

impl VerificationReason {
    pub fn is_range_error(&self) -> bool {
        matches!(self, VerificationReason::RangeOutOfBounds { .. })
    }
}

impl std::fmt::Display for VerificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationReason::RangeOutOfBounds {
                start_line,
                end_line,
                line_count,
            } => write!(
                f,
                "invalid line range: {start_line}-{end_line} for file with {line_count} lines"
            ),
            VerificationReason::EmptyName => f.write_str("claim has an empty symbol name"),
            VerificationReason::NameNotFound { name } => {
                write!(f, "name not found in range: '{name}'")
            }
            VerificationReason::PatternMatched { kind, pattern } => {
                write!(f, "matched {kind} pattern `{pattern}`")
            }
            VerificationReason::FallbackAccepted => {
                f.write_str("fallback: name present, pattern inconclusive")
            }
            VerificationReason::PatternNotMatched { kind } => {
                write!(f, "name present but no {kind} pattern matched")
            }
            VerificationReason::SourceUnavailable { file_path } => {
                write!(f, "file not readable: {file_path}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub reason: VerificationReason,
}

impl VerificationOutcome {
    fn accepted(reason: VerificationReason) -> Self {
        Self {
            verified: true,
            reason,
        }
    }

    fn rejected(reason: VerificationReason) -> Self {
        Self {
            verified: false,
            reason,
        }
    }

    /// Rejection for a claim whose file content could not be obtained.
    pub fn unreadable(file_path: impl Into<String>) -> Self {
        Self::rejected(VerificationReason::SourceUnavailable {
            file_path: file_path.into(),
        })
    }
}

/// Result of checking a single reported reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceCheck {
    Confirmed,
    LineOutOfBounds,
    NameAbsent,
}

/// Serializable verifier settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub fallback_policy: FallbackPolicy,
    /// Kind name → extra `{name}` templates appended after the built-in alternatives
    pub extra_patterns: BTreeMap<String, Vec<String>>,
}

/// Pure, side-effect free plausibility check of symbol claims against raw source text.
#[derive(Debug, Clone)]
pub struct Verifier {
    patterns: PatternSet,
    fallback: FallbackPolicy,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(PatternSet::builtin(), FallbackPolicy::default())
    }
}

impl Verifier {
    pub fn new(patterns: PatternSet, fallback: FallbackPolicy) -> Self {
        Self { patterns, fallback }
    }

    pub fn from_config(config: &VerifierConfig) -> Result<Self> {
        let mut patterns = PatternSet::builtin();
        patterns.extend_from_map(&config.extra_patterns)?;
        Ok(Self::new(patterns, config.fallback_policy))
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn verify(&self, content: &str, claim: &SymbolClaim) -> VerificationOutcome {
        let lines = source_lines(content);
        if claim.start_line < 1 || claim.end_line < claim.start_line || claim.end_line > lines.len()
        {
            return VerificationOutcome::rejected(VerificationReason::RangeOutOfBounds {
                start_line: claim.start_line,
                end_line: claim.end_line,
                line_count: lines.len(),
            });
        }
        if claim.name.is_empty() {
            return VerificationOutcome::rejected(VerificationReason::EmptyName);
        }

        let slice = lines[claim.start_line - 1..claim.end_line].join("\n");
        if !slice.contains(&claim.name) {
            return VerificationOutcome::rejected(VerificationReason::NameNotFound {
                name: claim.name.clone(),
            });
        }

        if let Some(pattern) = self.patterns.find_match(&claim.kind, &claim.name, &slice) {
            return VerificationOutcome::accepted(VerificationReason::PatternMatched {
                kind: claim.kind.to_string(),
                pattern: pattern.template().to_string(),
            });
        }

        log::debug!(
            "No {} pattern matched {} in {}:{}-{}",
            claim.kind,
            claim.name,
            claim.file_path,
            claim.start_line,
            claim.end_line
        );
        match self.fallback {
            FallbackPolicy::AcceptNamePresent => {
                VerificationOutcome::accepted(VerificationReason::FallbackAccepted)
            }
            FallbackPolicy::Reject => {
                VerificationOutcome::rejected(VerificationReason::PatternNotMatched {
                    kind: claim.kind.to_string(),
                })
            }
        }
    }

    /// Check that 1-based `line` exists and mentions `name`.
    pub fn verify_reference(&self, content: &str, line: usize, name: &str) -> ReferenceCheck {
        if line == 0 {
            return ReferenceCheck::LineOutOfBounds;
        }
        match source_lines(content).get(line - 1) {
            None => ReferenceCheck::LineOutOfBounds,
            Some(text) if !name.is_empty() && text.contains(name) => ReferenceCheck::Confirmed,
            Some(_) => ReferenceCheck::NameAbsent,
        }
    }
}

/// Split on `\n` only; a trailing newline leaves an empty last line that
/// backends may report as a symbol's end. `\r` is stripped per line.
fn source_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
