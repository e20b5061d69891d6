use std::sync::Arc;

use cambist_mcp::McpService;

use crate::session::SessionRegistry;

/// Transport the process serves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transport {
    /// MCP over Server-Sent Events (HTTP listener).
    Sse,
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
}

/// Listener configuration for the SSE transport.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application state shared across handlers.
///
/// Everything here is read-only or internally synchronized; sessions own
/// their mutable state individually.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(service: Arc<McpService>) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(service)),
        }
    }
}
