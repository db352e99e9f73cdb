use context_verifier::{Language, SymbolClaim, VerificationOutcome};
use serde::{Deserialize, Serialize};

/// A claim together with the verifier's judgment on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub language: Language,
    pub claim: SymbolClaim,
    pub outcome: VerificationOutcome,
}

/// How many occurrences of one structural element survived into a skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementObservation {
    pub language: Language,
    pub file_path: String,
    pub element: String,
    pub found: usize,
    pub expected: usize,
}

/// Line counts of a file and of the skeleton generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineObservation {
    pub language: Language,
    pub file_path: String,
    pub original_lines: usize,
    pub skeleton_lines: usize,
    /// `# Line` / `// Line` markers in the skeleton
    #[serde(default)]
    pub line_refs: usize,
}

/// Evidence gathered while cases run, consumed by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub claims: Vec<ClaimRecord>,
    pub elements: Vec<ElementObservation>,
    pub lines: Vec<LineObservation>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty() && self.elements.is_empty() && self.lines.is_empty()
    }

    pub fn record_claim(
        &mut self,
        language: Language,
        claim: SymbolClaim,
        outcome: VerificationOutcome,
    ) -> bool {
        let verified = outcome.verified;
        self.claims.push(ClaimRecord {
            language,
            claim,
            outcome,
        });
        verified
    }

    pub fn record_elements(&mut self, observation: ElementObservation) {
        self.elements.push(observation);
    }

    pub fn record_lines(&mut self, observation: LineObservation) {
        self.lines.push(observation);
    }

    /// Append `other`, preserving order.
    pub fn absorb(&mut self, other: Evidence) {
        self.claims.extend(other.claims);
        self.elements.extend(other.elements);
        self.lines.extend(other.lines);
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.claims
            .iter()
            .map(|c| c.language)
            .chain(self.elements.iter().map(|e| e.language))
            .chain(self.lines.iter().map(|l| l.language))
    }
}
