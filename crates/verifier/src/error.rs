use thiserror::Error;

/// Result type for verifier setup
pub type Result<T> = std::result::Result<T, VerifierError>;

/// Errors raised while building a verifier. Verification itself never fails.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Template does not contain the `{name}` placeholder
    #[error("Pattern template for {kind} is missing the {{name}} placeholder: {template}")]
    MissingPlaceholder { kind: String, template: String },

    /// Template does not compile as a regular expression
    #[error("Invalid pattern for {kind}: {source}")]
    InvalidPattern {
        kind: String,
        #[source]
        source: regex::Error,
    },

    /// Unknown fallback policy name
    #[error("Unknown fallback policy: {0} (expected accept_name_present or reject)")]
    UnknownFallbackPolicy(String),
}
