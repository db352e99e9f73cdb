use crate::language::Language;
use std::collections::BTreeMap;

/// One structural element tracked for skeleton preservation, counted by substring needles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRule {
    pub name: &'static str,
    pub needles: &'static [&'static str],
}

const fn rule(name: &'static str, needles: &'static [&'static str]) -> ElementRule {
    ElementRule { name, needles }
}

const PYTHON: &[ElementRule] = &[
    rule("classes", &["class "]),
    rule("functions", &["def "]),
    rule("imports", &["import ", "from "]),
];

const CSHARP: &[ElementRule] = &[
    rule("namespaces", &["namespace "]),
    rule("classes", &["class ", "interface "]),
    rule("methods", &["public ", "private ", "protected "]),
    rule("using_statements", &["using "]),
];

const CPP: &[ElementRule] = &[
    rule("includes", &["#include"]),
    rule("classes", &["class "]),
    rule("functions", &["::", "("]),
];

const RUST: &[ElementRule] = &[
    rule("structs", &["struct ", "enum ", "trait "]),
    rule("functions", &["fn "]),
    rule("imports", &["use "]),
    rule("impls", &["impl "]),
];

const JAVA: &[ElementRule] = &[
    rule("classes", &["class ", "interface "]),
    rule("methods", &["public ", "private ", "protected "]),
    rule("imports", &["import "]),
];

const GO: &[ElementRule] = &[
    rule("types", &["type "]),
    rule("functions", &["func "]),
    rule("imports", &["import "]),
];

const SCRIPT: &[ElementRule] = &[
    rule("classes", &["class ", "interface "]),
    rule("functions", &["function "]),
    rule("imports", &["import "]),
];

/// Elements tracked per language. Unknown languages track nothing.
pub fn element_rules(language: Language) -> &'static [ElementRule] {
    match language {
        Language::Python => PYTHON,
        Language::CSharp => CSHARP,
        Language::Cpp | Language::C => CPP,
        Language::Rust => RUST,
        Language::Java => JAVA,
        Language::Go => GO,
        Language::JavaScript | Language::TypeScript => SCRIPT,
        Language::Unknown => &[],
    }
}

/// Count tracked elements of `language` in `text`.
///
/// Counting is deliberately coarse (plain substring occurrences); it runs identically
/// over the original file and its skeleton so the two counts are comparable.
pub fn count_elements(language: Language, text: &str) -> BTreeMap<&'static str, usize> {
    element_rules(language)
        .iter()
        .map(|rule| {
            let count = rule
                .needles
                .iter()
                .map(|needle| text.matches(needle).count())
                .sum();
            (rule.name, count)
        })
        .collect()
}

/// Line markers skeleton generators emit to point back into the original file.
pub const LINE_REF_MARKERS: &[&str] = &["# Line ", "// Line"];

/// Count line markers in a skeleton. Originals carry none, so this is never a
/// preservation ratio.
pub fn count_line_refs(skeleton: &str) -> usize {
    LINE_REF_MARKERS
        .iter()
        .map(|marker| skeleton.matches(marker).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn python_elements_are_counted() {
        let source = "import math\nfrom typing import List\n\nclass A:\n    def f(self):\n        pass\n";
        let counts = count_elements(Language::Python, source);
        assert_eq!(counts["classes"], 1);
        assert_eq!(counts["functions"], 1);
        // "from typing import" counts for both needles
        assert_eq!(counts["imports"], 3);
    }

    #[test]
    fn line_refs_count_both_comment_styles() {
        let skeleton = "class A:  # Line 4\n    def f(self): ...  # Line 5\nint g(); // Lines 9-12\n";
        assert_eq!(count_line_refs(skeleton), 3);
        assert_eq!(count_line_refs("class A: ..."), 0);
    }

    #[test]
    fn unknown_language_tracks_nothing() {
        assert!(count_elements(Language::Unknown, "class A {}").is_empty());
    }

    #[test]
    fn every_known_language_tracks_something() {
        for language in [
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Java,
            Language::C,
            Language::Cpp,
            Language::CSharp,
        ] {
            assert!(!element_rules(language).is_empty(), "{language}");
        }
    }
}
