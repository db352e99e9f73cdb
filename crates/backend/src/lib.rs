//! # Context Backend
//!
//! Adapter contract between the accuracy suites and a code-analysis backend.
//!
//! ```text
//! BackendClient (timeouts, "Error" marker, typed decoding)
//!     │
//!     └──> dyn AnalysisBackend
//!            ├─ HttpBackend          POST {url}/mcp, JSON-RPC tools/call
//!            ├─ ChildProcessBackend  MCP over stdio (rmcp)
//!            └─ ReplayBackend        recorded responses
//! ```

mod adapter;
mod child_process;
mod client;
mod error;
mod http;
mod replay;

pub use adapter::{contains_error_marker, decode_tool_text, AnalysisBackend, ERROR_MARKER};
pub use child_process::ChildProcessBackend;
pub use client::{BackendClient, ClientConfig};
pub use error::{BackendError, Result};
pub use http::HttpBackend;
pub use replay::{primary_key, ReplayBackend, ReplayEntry, ReplayScript, ANY_KEY};
