use crate::adapter::AnalysisBackend;
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Key matching any argument value for an operation.
pub const ANY_KEY: &str = "*";

/// One recorded answer. Exactly one of `response`/`error` is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub operation: String,
    #[serde(default = "any_key")]
    pub key: String,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

fn any_key() -> String {
    ANY_KEY.to_string()
}

/// On-disk replay script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub responses: Vec<ReplayEntry>,
}

/// Backend answering from recorded responses instead of a live server.
///
/// Responses are keyed by operation and the call's primary argument (`file_path`,
/// `symbol_name`, or the first of `file_paths`). Unrecorded calls fail with an error
/// payload, like a backend asked about a file it does not know.
#[derive(Debug, Clone, Default)]
pub struct ReplayBackend {
    tools: Vec<String>,
    responses: HashMap<(String, String), std::result::Result<Value, String>>,
    delay: Option<Duration>,
    unreachable: bool,
}

impl ReplayBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_script(script: ReplayScript) -> Self {
        let mut backend = Self::new().with_tools(script.tools);
        for entry in script.responses {
            let answer = match (entry.response, entry.error) {
                (_, Some(error)) => Err(error),
                (Some(response), None) => Ok(response),
                (None, None) => Ok(Value::Null),
            };
            backend
                .responses
                .insert((entry.operation, entry.key), answer);
        }
        backend
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BackendError::Transport(format!("cannot read replay script {}: {err}", path.display()))
        })?;
        let script: ReplayScript = serde_json::from_str(&raw)?;
        Ok(Self::from_script(script))
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn respond(mut self, operation: &str, key: &str, response: Value) -> Self {
        self.responses
            .insert((operation.to_string(), key.to_string()), Ok(response));
        self
    }

    pub fn fail(mut self, operation: &str, key: &str, error: &str) -> Self {
        self.responses.insert(
            (operation.to_string(), key.to_string()),
            Err(error.to_string()),
        );
        self
    }

    /// Delay every answer (used to exercise timeouts and response-time checks).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Behave like a backend that cannot be reached.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn lookup(&self, operation: &str, key: &str) -> Option<&std::result::Result<Value, String>> {
        self.responses
            .get(&(operation.to_string(), key.to_string()))
            .or_else(|| {
                self.responses
                    .get(&(operation.to_string(), ANY_KEY.to_string()))
            })
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(BackendError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Primary argument used to key recorded responses.
pub fn primary_key(arguments: &Value) -> String {
    for field in ["file_path", "symbol_name"] {
        if let Some(value) = arguments.get(field).and_then(Value::as_str) {
            return value.to_string();
        }
    }
    arguments
        .get("file_paths")
        .and_then(Value::as_array)
        .and_then(|paths| paths.first())
        .and_then(Value::as_str)
        .unwrap_or(ANY_KEY)
        .to_string()
}

#[async_trait]
impl AnalysisBackend for ReplayBackend {
    async fn call(&self, operation: &str, arguments: Value) -> Result<Value> {
        self.check_reachable()?;
        self.pause().await;
        let key = primary_key(&arguments);
        match self.lookup(operation, &key) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(error)) => Err(BackendError::ErrorPayload(error.clone())),
            None => Err(BackendError::ErrorPayload(format!(
                "Error: no recorded response for {operation} ({key})"
            ))),
        }
    }

    async fn list_tools(&self) -> Result<Vec<String>> {
        self.check_reachable()?;
        self.pause().await;
        Ok(self.tools.clone())
    }

    fn describe(&self) -> String {
        format!("replay ({} recorded responses)", self.responses.len())
    }
}
