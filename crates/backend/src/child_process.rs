use crate::adapter::{decode_tool_text, AnalysisBackend};
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use rmcp::RoleClient;
use serde_json::Value;
use tokio::process::Command;

/// MCP server spawned as a child process and spoken to over stdio.
pub struct ChildProcessBackend {
    label: String,
    service: RunningService<RoleClient, ()>,
}

impl ChildProcessBackend {
    pub async fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        // Keep the server quiet on stderr unless the caller set RUST_LOG explicitly
        if std::env::var_os("RUST_LOG").is_none() {
            cmd.env("RUST_LOG", "warn");
        }

        let transport =
            TokioChildProcess::new(cmd).map_err(|err| BackendError::Spawn(err.to_string()))?;
        let service = ()
            .serve(transport)
            .await
            .map_err(|err| BackendError::Spawn(err.to_string()))?;

        let label = if args.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", args.join(" "))
        };
        log::info!("Started MCP backend: {label}");
        Ok(Self { label, service })
    }
}

#[async_trait]
impl AnalysisBackend for ChildProcessBackend {
    async fn call(&self, operation: &str, arguments: Value) -> Result<Value> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: operation.to_string().into(),
                arguments: arguments.as_object().cloned(),
            })
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .ok_or_else(|| BackendError::malformed(format!("{operation} returned no text content")))?;
        decode_tool_text(&text, result.is_error == Some(true))
    }

    async fn list_tools(&self) -> Result<Vec<String>> {
        let tools = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(tools.tools.iter().map(|t| t.name.to_string()).collect())
    }

    fn describe(&self) -> String {
        format!("child process {}", self.label)
    }
}
