use context_verifier::{SymbolClaim, SymbolKind, VerificationReason, Verifier};
use proptest::prelude::*;

fn python_fixture() -> String {
    let mut source = String::from(
        "\"\"\"\nA basic Python module for testing code analysis\n\"\"\"\n\nimport math\nfrom typing import List, Optional\n\nclass BasicClass:\n    \"\"\"A basic class for testing Python parsing\"\"\"\n\n    def __init__(self, value: int = 0):\n        self._private_field = value\n\n    def add(self, a: int, b: int) -> int:\n        return a + b\n",
    );
    while source.lines().count() < 50 {
        source.push_str("    # padding\n");
    }
    // Exactly 50 lines, no empty line after the last newline
    source.pop();
    source
}

fn csharp_fixture() -> &'static str {
    "using System;\n\nnamespace TestSuite\n{\n    public class BasicClass\n    {\n        private int _value;\n\n        public int Add(int a, int b)\n        {\n            return a + b;\n        }\n    }\n}\n"
}

#[test]
fn python_class_at_line_eight_is_verified_by_pattern() {
    let source = python_fixture();
    let claim = SymbolClaim::new("basic_class.py", "BasicClass", SymbolKind::Class, 8, 40);

    let outcome = Verifier::default().verify(&source, &claim);

    assert!(outcome.verified, "{outcome:?}");
    match outcome.reason {
        VerificationReason::PatternMatched { kind, pattern } => {
            assert_eq!(kind, "class");
            assert!(pattern.contains("class"), "unexpected pattern {pattern}");
        }
        other => panic!("expected a class pattern match, got {other}"),
    }
}

#[test]
fn python_method_is_verified_by_def_pattern() {
    let source = python_fixture();
    let claim = SymbolClaim::new("basic_class.py", "add", SymbolKind::Method, 14, 15);
    assert!(Verifier::default().verify(&source, &claim).verified);
}

#[test]
fn claim_missing_the_name_in_range_fails() {
    let source = python_fixture();
    let claim = SymbolClaim::new("basic_class.py", "Config", SymbolKind::Class, 10, 20);

    let outcome = Verifier::default().verify(&source, &claim);
    assert!(!outcome.verified);
    assert!(matches!(outcome.reason, VerificationReason::NameNotFound { .. }));
}

#[test]
fn claim_beyond_a_fifty_line_file_is_a_range_error() {
    let source = python_fixture();
    assert_eq!(source.split('\n').count(), 50);
    let claim = SymbolClaim::new("basic_class.py", "BasicClass", SymbolKind::Class, 8, 999);

    let outcome = Verifier::default().verify(&source, &claim);
    assert!(!outcome.verified);
    assert!(outcome.reason.is_range_error());
    assert!(outcome.reason.to_string().contains("50 lines"));
}

#[test]
fn csharp_members_match_their_kinds() {
    let verifier = Verifier::default();
    let cases = [
        ("TestSuite", SymbolKind::Module, 3, 14),
        ("BasicClass", SymbolKind::Class, 5, 13),
        ("Add", SymbolKind::Method, 9, 12),
        ("_value", SymbolKind::Variable, 7, 7),
    ];
    for (name, kind, start, end) in cases {
        let claim = SymbolClaim::new("BasicClass.cs", name, kind.clone(), start, end);
        let outcome = verifier.verify(csharp_fixture(), &claim);
        assert!(
            matches!(outcome.reason, VerificationReason::PatternMatched { .. }),
            "{name} ({kind}) -> {}",
            outcome.reason
        );
    }
}

#[test]
fn end_line_on_the_line_after_a_trailing_newline_is_in_range() {
    let source = "class A:\n    pass\n";
    let claim = SymbolClaim::new("a.py", "A", SymbolKind::Module, 1, 3);

    let outcome = Verifier::default().verify(source, &claim);
    assert!(outcome.verified, "{}", outcome.reason);

    let past = SymbolClaim::new("a.py", "A", SymbolKind::Module, 1, 4);
    let outcome = Verifier::default().verify(source, &past);
    assert_eq!(
        outcome.reason.to_string(),
        "invalid line range: 1-4 for file with 3 lines"
    );
}

proptest! {
    #[test]
    fn end_line_past_file_is_always_a_range_error(
        lines in 1usize..80,
        start in 1usize..80,
        overshoot in 1usize..1000,
    ) {
        let source = "class Sample:\n".repeat(lines);
        let line_count = source.split('\n').count();
        let claim = SymbolClaim::new("sample.py", "Sample", SymbolKind::Class, start.min(lines), line_count + overshoot);
        let outcome = Verifier::default().verify(&source, &claim);
        prop_assert!(!outcome.verified);
        prop_assert!(outcome.reason.is_range_error());
    }

    #[test]
    fn absent_name_is_never_verified(
        name in "[A-Z][a-z]{3,10}",
        lines in 1usize..40,
    ) {
        let source = "x = 1\n".repeat(lines);
        let claim = SymbolClaim::new("sample.py", name, SymbolKind::Class, 1, lines);
        let outcome = Verifier::default().verify(&source, &claim);
        prop_assert!(!outcome.verified);
        let is_name_not_found = matches!(outcome.reason, VerificationReason::NameNotFound { .. });
        prop_assert!(is_name_not_found);
    }
}
