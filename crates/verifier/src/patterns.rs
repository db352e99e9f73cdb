use crate::error::{Result, VerifierError};
use crate::kind::SymbolKind;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

const PLACEHOLDER: &str = "{name}";

/// Declaration shape for one syntax, with `{name}` standing for the symbol.
///
/// The placeholder expands to the escaped name wrapped in identifier boundaries,
/// so `\bclass\s+{name}` matches `class Config:` but not `class ConfigToml:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    template: String,
}

impl NamePattern {
    pub fn new(kind: &SymbolKind, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(PLACEHOLDER) {
            return Err(VerifierError::MissingPlaceholder {
                kind: kind.to_string(),
                template,
            });
        }
        let pattern = Self { template };
        pattern
            .compile("probe")
            .map_err(|source| VerifierError::InvalidPattern {
                kind: kind.to_string(),
                source,
            })?;
        Ok(pattern)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Compile the pattern for a concrete symbol name (case-insensitive, multi-line).
    pub fn compile(&self, name: &str) -> std::result::Result<Regex, regex::Error> {
        let expanded = self.template.replace(PLACEHOLDER, &bounded_name(name));
        RegexBuilder::new(&expanded)
            .case_insensitive(true)
            .multi_line(true)
            .build()
    }

    pub fn matches(&self, name: &str, text: &str) -> bool {
        match self.compile(name) {
            Ok(re) => re.is_match(text),
            Err(err) => {
                log::warn!("Skipping pattern {} for {name}: {err}", self.template);
                false
            }
        }
    }
}

fn bounded_name(name: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::new();
    if name.chars().next().is_some_and(is_word) {
        out.push_str(r"\b");
    }
    out.push_str(&regex::escape(name));
    if name.chars().last().is_some_and(is_word) {
        out.push_str(r"\b");
    }
    out
}

const CLASS_PATTERNS: &[&str] = &[
    r"\bclass\s+{name}",
    r"\bstruct\s+{name}",
    r"\binterface\s+{name}",
    r"\benum\s+(?:class\s+)?{name}",
    r"\brecord\s+(?:struct\s+|class\s+)?{name}",
    r"\btrait\s+{name}",
    r"\bunion\s+{name}",
    r"\btype\s+{name}",
];

const FUNCTION_PATTERNS: &[&str] = &[
    r"\bfunction\s*\*?\s*{name}",
    r"\bdef\s+{name}",
    r"\bfn\s+{name}",
    r"\bfunc\s+{name}",
    r"\b(?:const|let|var)\s+{name}\s*=",
    r"^\s*(?:[\w:<>,\[\]\*&]+\s+)+[\*&]?{name}\s*\(",
];

const METHOD_PATTERNS: &[&str] = &[
    r"{name}\s*\(",
    r"\bfn\s+{name}",
    r"\bdef\s+{name}",
    r"\bfunc\s+\([^)]*\)\s*{name}",
    r"\b(?:public|private|protected|internal|static|virtual|override|async)\s+(?:[\w<>\[\],\.\?]+\s+)*{name}",
];

const VARIABLE_PATTERNS: &[&str] = &[
    r"\b(?:let|const|var|static)\s+(?:mut\s+)?{name}",
    r"^\s*(?:self\.|this\.)?{name}\s*(?::[^=\n]*)?=",
    r"\b[\w<>\[\]\?]+\s+{name}\s*(?:=|;|\{)",
];

const MODULE_PATTERNS: &[&str] = &[
    r"\bmod\s+{name}",
    r"\bmodule\s+{name}",
    r"\bnamespace\s+{name}",
    r"\bpackage\s+{name}",
];

static BUILTIN: Lazy<PatternSet> = Lazy::new(|| {
    let mut set = PatternSet::empty();
    for (kind, templates) in [
        (SymbolKind::Class, CLASS_PATTERNS),
        (SymbolKind::Function, FUNCTION_PATTERNS),
        (SymbolKind::Method, METHOD_PATTERNS),
        (SymbolKind::Variable, VARIABLE_PATTERNS),
        (SymbolKind::Module, MODULE_PATTERNS),
    ] {
        for template in templates {
            let pattern = NamePattern {
                template: (*template).to_string(),
            };
            set.patterns.entry(kind.clone()).or_default().push(pattern);
        }
    }
    set
});

/// Kind → ordered alternative declaration patterns.
///
/// New syntaxes are added by appending alternatives; matching stops at the first hit.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: BTreeMap<SymbolKind, Vec<NamePattern>>,
}

impl PatternSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Patterns for Python, Rust, C#, C++, Java, Go and TypeScript/JavaScript declarations.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Append one alternative for `kind`.
    pub fn with_pattern(mut self, kind: SymbolKind, template: &str) -> Result<Self> {
        self.push(kind, template)?;
        Ok(self)
    }

    pub fn push(&mut self, kind: SymbolKind, template: &str) -> Result<()> {
        let pattern = NamePattern::new(&kind, template)?;
        self.patterns.entry(kind).or_default().push(pattern);
        Ok(())
    }

    /// Append every template from a kind-name → templates map (configuration input).
    pub fn extend_from_map(&mut self, extra: &BTreeMap<String, Vec<String>>) -> Result<()> {
        for (kind, templates) in extra {
            let kind = SymbolKind::parse(kind);
            for template in templates {
                self.push(kind.clone(), template)?;
            }
        }
        Ok(())
    }

    pub fn patterns_for(&self, kind: &SymbolKind) -> &[NamePattern] {
        self.patterns.get(kind).map_or(&[], Vec::as_slice)
    }

    /// First pattern for `kind` that matches `name` inside `text`.
    pub fn find_match(&self, kind: &SymbolKind, name: &str, text: &str) -> Option<&NamePattern> {
        self.patterns_for(kind)
            .iter()
            .find(|pattern| pattern.matches(name, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_all_compile() {
        let set = PatternSet::builtin();
        for kind in [
            SymbolKind::Class,
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Variable,
            SymbolKind::Module,
        ] {
            assert!(!set.patterns_for(&kind).is_empty(), "no patterns for {kind}");
            for pattern in set.patterns_for(&kind) {
                assert!(
                    pattern.compile("Sample").is_ok(),
                    "template failed: {}",
                    pattern.template()
                );
            }
        }
    }

    #[test]
    fn name_boundary_rejects_longer_identifiers() {
        let set = PatternSet::builtin();
        assert!(set
            .find_match(&SymbolKind::Class, "Config", "pub struct ConfigToml {")
            .is_none());
        assert!(set
            .find_match(&SymbolKind::Class, "Config", "pub struct Config {")
            .is_some());
    }

    #[test]
    fn matching_is_case_insensitive_on_keywords() {
        let set = PatternSet::builtin();
        assert!(set
            .find_match(&SymbolKind::Module, "Shapes", "NAMESPACE Shapes {")
            .is_some());
    }

    #[test]
    fn names_with_symbols_are_escaped() {
        let set = PatternSet::builtin();
        assert!(set
            .find_match(&SymbolKind::Method, "operator+", "Vec operator+(const Vec& o)")
            .is_some());
    }

    #[test]
    fn templates_without_placeholder_are_rejected() {
        let err = PatternSet::empty()
            .with_pattern(SymbolKind::Class, r"\bclass\s+\w+")
            .unwrap_err();
        assert!(matches!(err, VerifierError::MissingPlaceholder { .. }));
    }

    #[test]
    fn broken_regex_is_rejected() {
        let err = PatternSet::empty()
            .with_pattern(SymbolKind::Function, r"proc\s+({name}")
            .unwrap_err();
        assert!(matches!(err, VerifierError::InvalidPattern { .. }));
    }

    #[test]
    fn appended_alternative_extends_a_kind() {
        let set = PatternSet::builtin()
            .with_pattern(SymbolKind::Function, r"\bsub\s+{name}")
            .unwrap();
        assert!(set
            .find_match(&SymbolKind::Function, "render", "sub render {")
            .is_some());
    }
}
