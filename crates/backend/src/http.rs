use crate::adapter::{decode_tool_text, truncate, AnalysisBackend};
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// MCP server reachable over HTTP (`POST {url}/mcp`, JSON-RPC 2.0).
pub struct HttpBackend {
    client: Client,
    base_url: String,
    next_id: AtomicU64,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/mcp", self.base_url)
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.client.post(self.endpoint()).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        let mut body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string);
            return Err(BackendError::ErrorPayload(message));
        }
        match body.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(BackendError::malformed(format!(
                "Invalid response: {}",
                truncate(&body.to_string(), 200)
            ))),
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn call(&self, operation: &str, arguments: Value) -> Result<Value> {
        let result = self
            .rpc(
                "tools/call",
                json!({ "name": operation, "arguments": arguments }),
            )
            .await?;
        tool_result_payload(&result)
    }

    async fn list_tools(&self) -> Result<Vec<String>> {
        let result = self.rpc("tools/list", json!({})).await?;
        let tools = result
            .get("tools")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::malformed("tools/list result has no tools array"))?;
        Ok(tools
            .iter()
            .filter_map(|tool| tool.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/test", self.base_url))
            .send()
            .await?;
        if response.status() == StatusCode::OK {
            return Ok(());
        }
        log::debug!(
            "{}/test answered {}, probing tools/list instead",
            self.base_url,
            response.status()
        );
        self.list_tools().await.map(|_| ())
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint())
    }
}

/// Extract the JSON payload from an MCP `CallToolResult` value.
pub(crate) fn tool_result_payload(result: &Value) -> Result<Value> {
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|content| content.first())
        .and_then(|item| item.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            BackendError::malformed(format!(
                "Invalid response: {}",
                truncate(&result.to_string(), 200)
            ))
        })?;
    decode_tool_text(text, is_error)
}
