use crate::adapter::{contains_error_marker, AnalysisBackend, ERROR_MARKER};
use crate::error::{BackendError, Result};
use context_protocol::{
    parse_definitions, parse_references, AnalyzeResponse, BackendOperation, SkeletonBundle,
    Subgraph, SymbolDefinition, SymbolReference,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::time::{Duration, Instant};

/// Per-call limits applied by [`BackendClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub call_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl ClientConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Typed view over an [`AnalysisBackend`].
///
/// Every call is bounded by a timeout, payloads carrying the error marker are
/// rejected, and responses are decoded into `context-protocol` shapes.
pub struct BackendClient {
    backend: Box<dyn AnalysisBackend>,
    config: ClientConfig,
}

impl BackendClient {
    pub fn new(backend: Box<dyn AnalysisBackend>, config: ClientConfig) -> Self {
        Self { backend, config }
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn ping(&self) -> Result<()> {
        bounded("ping", self.config.connect_timeout(), self.backend.ping()).await
    }

    pub async fn list_tools(&self) -> Result<Vec<String>> {
        bounded(
            "tools/list",
            self.config.call_timeout(),
            self.backend.list_tools(),
        )
        .await
    }

    /// Invoke `operation` and return the raw payload after the error-marker check.
    pub async fn call(&self, operation: BackendOperation, arguments: Value) -> Result<Value> {
        let started = Instant::now();
        let value = bounded(
            operation.as_str(),
            self.config.call_timeout(),
            self.backend.call(operation.as_str(), arguments),
        )
        .await;
        log::debug!(
            "{operation} finished in {}ms (ok={})",
            started.elapsed().as_millis(),
            value.is_ok()
        );

        let value = value?;
        if contains_error_marker(&value) {
            return Err(BackendError::ErrorPayload(format!(
                "{operation} payload contains \"{ERROR_MARKER}\": {}",
                crate::adapter::truncate(&value.to_string(), 200)
            )));
        }
        Ok(value)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        operation: BackendOperation,
        arguments: Value,
    ) -> Result<T> {
        let value = self.call(operation, arguments).await?;
        serde_json::from_value(value)
            .map_err(|err| BackendError::malformed(format!("{operation}: {err}")))
    }

    pub async fn analyze_file(&self, file_path: &str) -> Result<AnalyzeResponse> {
        self.call_typed(
            BackendOperation::AnalyzeCode,
            json!({ "file_path": file_path }),
        )
        .await
    }

    pub async fn find_definitions(&self, symbol_name: &str) -> Result<Vec<SymbolDefinition>> {
        let value = self
            .call(
                BackendOperation::FindSymbolDefinitions,
                json!({ "symbol_name": symbol_name }),
            )
            .await?;
        parse_definitions(value).map_err(|err| BackendError::malformed(err.to_string()))
    }

    pub async fn find_references(&self, symbol_name: &str) -> Result<Vec<SymbolReference>> {
        let value = self
            .call(
                BackendOperation::FindSymbolReferences,
                json!({ "symbol_name": symbol_name }),
            )
            .await?;
        parse_references(value).map_err(|err| BackendError::malformed(err.to_string()))
    }

    pub async fn symbol_subgraph(&self, symbol_name: &str, depth: usize) -> Result<Subgraph> {
        self.call_typed(
            BackendOperation::GetSymbolSubgraph,
            json!({ "symbol_name": symbol_name, "depth": depth, "max_depth": depth }),
        )
        .await
    }

    pub async fn skeletons(&self, file_paths: &[String], max_tokens: usize) -> Result<SkeletonBundle> {
        self.call_typed(
            BackendOperation::GetMultipleFilesSkeleton,
            json!({ "file_paths": file_paths, "max_tokens": max_tokens }),
        )
        .await
    }
}

async fn bounded<T>(
    operation: &str,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("{operation} timed out after {}ms", timeout.as_millis());
            Err(BackendError::timeout(operation, timeout))
        }
    }
}
