//! # Context Protocol
//!
//! Shapes of the payloads a code-analysis backend returns for the operations the
//! accuracy suites consume. Backends disagree on small details (`file` vs
//! `file_path`, bare arrays vs wrapped objects, numeric vs string node ids), so
//! every shape here deserializes tolerantly.

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Logical operation exposed by an analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOperation {
    AnalyzeCode,
    FindSymbolDefinitions,
    FindSymbolReferences,
    GetSymbolSubgraph,
    GetMultipleFilesSkeleton,
}

impl BackendOperation {
    pub const ALL: [BackendOperation; 5] = [
        BackendOperation::AnalyzeCode,
        BackendOperation::FindSymbolDefinitions,
        BackendOperation::FindSymbolReferences,
        BackendOperation::GetSymbolSubgraph,
        BackendOperation::GetMultipleFilesSkeleton,
    ];

    /// Tool name as advertised over MCP.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendOperation::AnalyzeCode => "analyze_code",
            BackendOperation::FindSymbolDefinitions => "find_symbol_definitions",
            BackendOperation::FindSymbolReferences => "find_symbol_references",
            BackendOperation::GetSymbolSubgraph => "get_symbol_subgraph",
            BackendOperation::GetMultipleFilesSkeleton => "get_multiple_files_skeleton",
        }
    }
}

impl std::fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbol reported by `analyze_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedSymbol {
    pub name: String,

    /// Backend kind string ("class", "method", "struct", ...)
    #[serde(alias = "kind")]
    pub symbol_type: String,

    #[serde(default, alias = "file")]
    pub file_path: Option<String>,

    /// 1-based, inclusive
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default, alias = "file")]
    pub file_path: Option<String>,
    pub symbols: Vec<AnalyzedSymbol>,
}

/// Candidate definition returned by `find_symbol_definitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    #[serde(alias = "file")]
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, alias = "kind")]
    pub symbol_type: Option<String>,
}

/// Occurrence returned by `find_symbol_references`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReference {
    #[serde(alias = "file")]
    pub file_path: String,
    pub line: usize,
    #[serde(default)]
    pub column: Option<usize>,
    #[serde(default)]
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DefinitionsPayload {
    Wrapped { definitions: Vec<SymbolDefinition> },
    Bare(Vec<SymbolDefinition>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ReferencesPayload {
    Wrapped { references: Vec<SymbolReference> },
    Bare(Vec<SymbolReference>),
}

/// Decode a definitions payload, accepting both `{"definitions": [...]}` and a bare array.
pub fn parse_definitions(value: serde_json::Value) -> Result<Vec<SymbolDefinition>> {
    Ok(match serde_json::from_value::<DefinitionsPayload>(value)? {
        DefinitionsPayload::Wrapped { definitions } => definitions,
        DefinitionsPayload::Bare(definitions) => definitions,
    })
}

/// Decode a references payload, accepting both `{"references": [...]}` and a bare array.
pub fn parse_references(value: serde_json::Value) -> Result<Vec<SymbolReference>> {
    Ok(match serde_json::from_value::<ReferencesPayload>(value)? {
        ReferencesPayload::Wrapped { references } => references,
        ReferencesPayload::Bare(references) => references,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphNode {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "kind")]
    pub symbol_type: Option<String>,
    #[serde(default, alias = "file")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphEdge {
    #[serde(deserialize_with = "id_string")]
    pub source: String,
    #[serde(deserialize_with = "id_string")]
    pub target: String,
    #[serde(default, alias = "type")]
    pub edge_type: Option<String>,
}

/// Nodes and edges around a symbol returned by `get_symbol_subgraph`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    #[serde(default)]
    pub nodes: Vec<SubgraphNode>,
    #[serde(default)]
    pub edges: Vec<SubgraphEdge>,
}

impl Subgraph {
    /// Number of edges whose both endpoints are among the returned nodes.
    #[must_use]
    pub fn valid_edge_count(&self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
            .count()
    }

    #[must_use]
    pub fn has_node_named(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name.contains(name))
    }
}

/// Condensed rendering of one file under a token budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonFile {
    #[serde(alias = "file")]
    pub file_path: String,
    #[serde(default)]
    pub skeleton: String,
    #[serde(default)]
    pub tokens: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonBundle {
    #[serde(default)]
    pub files: Vec<SkeletonFile>,
    #[serde(default)]
    pub total_tokens: Option<usize>,
}

fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn definitions_accept_wrapped_and_bare_shapes() {
        let wrapped = json!({
            "definitions": [{"file": "src/config.rs", "start_line": 3, "end_line": 9}]
        });
        let bare = json!([{"file_path": "src/config.rs", "start_line": 3, "end_line": 9}]);

        let a = parse_definitions(wrapped).unwrap();
        let b = parse_definitions(bare).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].file_path, "src/config.rs");
    }

    #[test]
    fn references_reject_missing_line() {
        let payload = json!({"references": [{"file": "a.rs"}]});
        assert!(parse_references(payload).is_err());
    }

    #[test]
    fn subgraph_counts_only_edges_between_known_nodes() {
        let graph: Subgraph = serde_json::from_value(json!({
            "nodes": [
                {"id": 1, "name": "Config"},
                {"id": "2", "name": "ConfigToml"}
            ],
            "edges": [
                {"source": "1", "target": 2, "edge_type": "uses"},
                {"source": "1", "target": "99"}
            ]
        }))
        .unwrap();

        assert_eq!(graph.valid_edge_count(), 1);
        assert!(graph.has_node_named("Config"));
    }

    #[test]
    fn operation_names_match_advertised_tools() {
        let names: Vec<&str> = BackendOperation::ALL.iter().map(|op| op.as_str()).collect();
        assert!(names.contains(&"get_multiple_files_skeleton"));
        assert_eq!(BackendOperation::AnalyzeCode.to_string(), "analyze_code");
    }
}
