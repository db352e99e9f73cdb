#![allow(dead_code)]

use context_accuracy::{
    run_suite, CorpusCheck, LanguageCheck, MemorySink, RunReport, SkeletonCorpus, SuiteConfig,
    TestOutcome,
};
use context_backend::{BackendClient, ReplayBackend};
use context_protocol::BackendOperation;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const CONFIG_RS: &str = "use std::path::PathBuf;

/// Application configuration
pub struct Config {
    pub model: String,
    pub cwd: PathBuf,
}

pub fn load_config_as_toml(path: &str) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}
";

pub const LIB_RS: &str = "mod config;

pub fn boot() -> std::io::Result<String> {
    config::load_config_as_toml(\"config.toml\")
}
";

pub const BASIC_PY: &str = "\"\"\"Basic fixture.\"\"\"
import os


class BasicClass:
    def add(self, a, b):
        return a + b


def helper():
    return os.getcwd()
";

pub const ALPHA_CS: &str = "using System;

namespace Demo
{
    public class Alpha
    {
        public int Add(int a, int b) { return a + b; }
    }
}
";

pub const BETA_CS: &str = "using System;

namespace Demo
{
    public class Beta
    {
        public string Name { get; set; }
    }
}
";

/// Small project on disk mirroring what the recorded backend answers describe.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("core/src/config.rs", CONFIG_RS),
            ("core/src/lib.rs", LIB_RS),
            ("tests/python/basic.py", BASIC_PY),
            ("tests/csharp/Alpha.cs", ALPHA_CS),
            ("tests/csharp/Beta.cs", BETA_CS),
        ];
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> SuiteConfig {
        let mut config = SuiteConfig {
            project_root: Some(self.root().to_path_buf()),
            ..SuiteConfig::default()
        };
        config.languages.push(LanguageCheck {
            language: "python".into(),
            file: "tests/python/basic.py".into(),
            expected_symbols: vec!["BasicClass".into(), "helper".into()],
        });
        config.corpora.push(CorpusCheck {
            language: "C#".into(),
            root: "tests/csharp".into(),
            extensions: vec![],
            min_file_success_rate: 70.0,
            min_symbol_accuracy: 10.0,
        });
        config.reliability.probe_file = Some("core/src/config.rs".into());
        config.reliability.large_file = Some("core/src/lib.rs".into());
        config.skeleton.corpora.push(SkeletonCorpus {
            language: "python".into(),
            root: "tests/python".into(),
            extensions: vec![],
        });
        config
    }
}

fn symbol(name: &str, kind: &str, start: usize, end: usize) -> serde_json::Value {
    json!({"name": name, "symbol_type": kind, "start_line": start, "end_line": end})
}

/// Backend whose every answer agrees with [`Fixture`].
pub fn healthy_backend() -> ReplayBackend {
    ReplayBackend::new()
        .with_tools(BackendOperation::ALL.iter().map(|op| op.as_str()))
        .respond(
            "find_symbol_definitions",
            "Config",
            json!({"definitions": [
                {"file_path": "core/src/config.rs", "start_line": 4, "end_line": 7, "symbol_type": "struct"}
            ]}),
        )
        .respond(
            "find_symbol_references",
            "load_config_as_toml",
            json!({"references": [
                {"file_path": "core/src/config.rs", "line": 9},
                {"file_path": "core/src/lib.rs", "line": 4}
            ]}),
        )
        .respond(
            "get_symbol_subgraph",
            "Config",
            json!({
                "nodes": [{"id": 1, "name": "Config"}, {"id": 2, "name": "load_config_as_toml"}],
                "edges": [{"source": 2, "target": 1, "type": "uses"}]
            }),
        )
        .respond(
            "analyze_code",
            "core/src/config.rs",
            json!({"symbols": [
                symbol("Config", "struct", 4, 7),
                symbol("load_config_as_toml", "function", 9, 11)
            ]}),
        )
        .respond(
            "analyze_code",
            "core/src/lib.rs",
            json!({"symbols": [symbol("boot", "function", 3, 5)]}),
        )
        .respond(
            "analyze_code",
            "tests/python/basic.py",
            json!({"symbols": [
                symbol("BasicClass", "class", 5, 7),
                symbol("add", "method", 6, 7),
                symbol("helper", "function", 10, 11)
            ]}),
        )
        .respond(
            "analyze_code",
            "tests/csharp/Alpha.cs",
            json!({"symbols": [symbol("Alpha", "class", 5, 8), symbol("Add", "method", 7, 7)]}),
        )
        .respond(
            "analyze_code",
            "tests/csharp/Beta.cs",
            json!({"symbols": [symbol("Beta", "class", 5, 8), symbol("Name", "property", 7, 7)]}),
        )
        .respond(
            "get_multiple_files_skeleton",
            "tests/python/basic.py",
            json!({"files": [{
                "file_path": "tests/python/basic.py",
                "skeleton": "import os\nclass BasicClass:\n    def add(self, a, b): ...\ndef helper(): ...",
                "tokens": 24
            }]}),
        )
}

pub async fn run(backend: ReplayBackend, config: &SuiteConfig) -> (RunReport, MemorySink) {
    let client = BackendClient::new(Box::new(backend), config.client_config());
    run_suite(&client, config, MemorySink::new()).await.unwrap()
}

pub fn outcome<'a>(report: &'a RunReport, prefix: &str) -> &'a TestOutcome {
    report
        .outcomes
        .iter()
        .find(|o| o.name.starts_with(prefix))
        .unwrap_or_else(|| panic!("no outcome starting with {prefix:?}"))
}
