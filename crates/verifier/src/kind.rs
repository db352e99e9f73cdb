use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Category of a claimed symbol.
///
/// Backends report a wider vocabulary than the verifier distinguishes; parsing folds
/// the common synonyms onto the five checked categories and keeps anything else as
/// [`SymbolKind::Other`], which is only checked for name presence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolKind {
    Class,
    Function,
    Method,
    Variable,
    Module,
    Other(String),
}

impl SymbolKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "class" | "struct" | "interface" | "enum" | "record" | "type" | "trait" | "union" => {
                SymbolKind::Class
            }
            "function" | "fn" | "func" => SymbolKind::Function,
            "method" | "constructor" => SymbolKind::Method,
            "variable" | "constant" | "const" | "field" | "property" => SymbolKind::Variable,
            "module" | "mod" | "namespace" | "package" => SymbolKind::Module,
            other => SymbolKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Variable => "variable",
            SymbolKind::Module => "module",
            SymbolKind::Other(name) => name,
        }
    }
}

impl FromStr for SymbolKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for SymbolKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SymbolKind> for String {
    fn from(value: SymbolKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_fold_onto_checked_kinds() {
        assert_eq!(SymbolKind::parse("Struct"), SymbolKind::Class);
        assert_eq!(SymbolKind::parse("INTERFACE"), SymbolKind::Class);
        assert_eq!(SymbolKind::parse("namespace"), SymbolKind::Module);
        assert_eq!(SymbolKind::parse("constant"), SymbolKind::Variable);
    }

    #[test]
    fn unknown_kinds_are_preserved() {
        let kind = SymbolKind::parse("Macro");
        assert_eq!(kind, SymbolKind::Other("macro".to_string()));
        assert_eq!(kind.to_string(), "macro");
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&SymbolKind::Method).unwrap();
        assert_eq!(json, "\"method\"");
        let back: SymbolKind = serde_json::from_str("\"constructor\"").unwrap();
        assert_eq!(back, SymbolKind::Method);
    }
}
