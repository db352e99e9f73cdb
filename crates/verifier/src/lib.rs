//! # Context Verifier
//!
//! Independent plausibility check for symbol metadata produced by a code-analysis
//! backend.
//!
//! The verifier does not parse source code. It re-reads the claimed line range and
//! applies coarse textual checks that catch gross backend errors:
//!
//! ```text
//! SymbolClaim (name, kind, start..=end)
//!     │
//!     ├──> Range check        → start ≥ 1, end ≤ line count
//!     ├──> Name presence      → verbatim, case-sensitive, inside the range
//!     ├──> Kind patterns      → first matching alternative wins
//!     └──> Fallback policy    → name present, no pattern matched
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_verifier::{SymbolClaim, SymbolKind, Verifier};
//!
//! let source = "\"\"\"Module docs\"\"\"\n\nclass BasicClass:\n    pass\n";
//! let claim = SymbolClaim::new("basic_class.py", "BasicClass", SymbolKind::Class, 3, 4);
//!
//! let outcome = Verifier::default().verify(source, &claim);
//! assert!(outcome.verified);
//! ```

mod elements;
mod error;
mod kind;
mod language;
mod patterns;
mod verifier;

pub use elements::{count_elements, count_line_refs, element_rules, ElementRule, LINE_REF_MARKERS};
pub use error::{Result, VerifierError};
pub use kind::SymbolKind;
pub use language::Language;
pub use patterns::{NamePattern, PatternSet};
pub use verifier::{
    FallbackPolicy, ReferenceCheck, SymbolClaim, VerificationOutcome, VerificationReason,
    Verifier, VerifierConfig,
};
