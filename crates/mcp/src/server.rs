// Transport-independent JSON-RPC dispatch, plus the stdio transport.
// The SSE transport in the server crate feeds the same McpService.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;

/// Dispatches MCP requests to the tool registry.
///
/// Holds no per-connection state: every transport (stdio, SSE sessions)
/// shares one instance behind an `Arc`.
pub struct McpService {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl McpService {
    pub fn new(name: impl Into<String>, version: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        match serde_json::from_str::<JsonRpcRequest>(raw) {
            Ok(request) => self.handle_request(request).await,
            Err(err) => {
                warn!(error = %err, "failed to parse JSON-RPC request");
                Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                ))
            }
        }
    }

    /// Handle a parsed request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            if request.method == "notifications/initialized" {
                debug!("client finished initialization");
            }
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };

        Some(response)
    }

    fn handle_initialize(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        let client = params
            .client_info
            .map(|info| info.name)
            .unwrap_or_else(|| "unknown".to_string());
        info!(client = %client, "client connected");

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability {
                        list_changed: false,
                    }),
                },
                server_info: self.info.clone(),
            },
        )
    }

    async fn handle_tools_call(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(err)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid parameters: {}", err)),
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing parameters"),
                );
            }
        };

        let Some(tool) = self.registry.get(&params.name) else {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)),
            );
        };

        debug!(tool = %params.name, "dispatching tool call");
        match tool.execute(params.arguments).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                warn!(tool = %params.name, error = %err, "tool execution failed");
                JsonRpcResponse::error(id, JsonRpcError::internal_error(err.to_string()))
            }
        }
    }
}

/// Newline-delimited JSON-RPC over stdin/stdout.
pub struct StdioServer {
    service: Arc<McpService>,
}

impl StdioServer {
    pub fn new(service: Arc<McpService>) -> Self {
        Self { service }
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> Result<()> {
        info!("stdio transport ready");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("stdin closed, shutting down");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.service.handle_message(&line).await {
                        let payload = serde_json::to_string(&response)?;
                        stdout.write_all(payload.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to read from stdin");
                    break;
                }
            }
        }

        Ok(())
    }
}
