//! Main client for the Cambist SDK.

use std::time::Duration;

use cambist_mcp::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, ListToolsResult, ToolSchema,
    PROTOCOL_VERSION,
};
use cambist_mcp::tools::CONVERT_TOOL_NAME;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{SdkError, SdkResult};
use crate::transport::SseTransport;

/// Client for a Cambist tool server.
#[derive(Debug, Clone)]
pub struct CambistClient {
    config: ClientConfig,
}

impl CambistClient {
    /// Create a new client builder.
    pub fn builder() -> CambistClientBuilder {
        CambistClientBuilder::new()
    }

    /// Open a streaming connection. The handshake completes once the server
    /// has named its message endpoint.
    pub async fn connect(&self) -> SdkResult<McpConnection> {
        let sse_url = self.config.base_url.join("/sse")?;
        let transport = SseTransport::connect(sse_url, self.config.timeout).await?;

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()?;

        Ok(McpConnection {
            http,
            transport,
            config: self.config.clone(),
            next_id: 0,
        })
    }
}

/// One open session with the server. Serves any number of sequential
/// invocations; drop it to close the session.
pub struct McpConnection {
    http: reqwest::Client,
    transport: SseTransport,
    config: ClientConfig,
    next_id: u64,
}

impl McpConnection {
    /// Perform the MCP initialize exchange.
    pub async fn initialize(&mut self) -> SdkResult<InitializeResult> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": self.config.client_name,
                "version": self.config.client_version,
            },
        });

        let result = self.request("initialize", Some(params)).await?;
        let initialized: InitializeResult = serde_json::from_value(result)?;
        self.notify("notifications/initialized", None).await?;

        debug!(server = %initialized.server_info.name, "initialized");
        Ok(initialized)
    }

    /// Discover the tools the server advertises.
    pub async fn list_tools(&mut self) -> SdkResult<Vec<ToolSchema>> {
        let result = self.request("tools/list", None).await?;
        let listed: ListToolsResult = serde_json::from_value(result)?;
        Ok(listed.tools)
    }

    /// Invoke a tool by name.
    pub async fn call_tool(
        &mut self,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> SdkResult<CallToolResult> {
        let params = serde_json::to_value(CallToolParams {
            name: name.into(),
            arguments,
        })?;

        let result = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Convert an amount between two currencies, returning the server's
    /// text payload (the conversion sentence, or one of the documented
    /// error sentences).
    pub async fn convert(&mut self, amount: f64, from: &str, to: &str) -> SdkResult<String> {
        let result = self
            .call_tool(
                CONVERT_TOOL_NAME,
                serde_json::json!({
                    "amount": amount,
                    "from_currency": from,
                    "to_currency": to,
                }),
            )
            .await?;

        result
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| SdkError::Protocol("tool result carried no text".to_string()))
    }

    /// URL this session POSTs messages to.
    pub fn messages_url(&self) -> &Url {
        self.transport.messages_url()
    }

    async fn request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> SdkResult<serde_json::Value> {
        self.next_id += 1;
        let id = self.next_id;

        self.post(&JsonRpcRequest::new(id, method, params)).await?;

        // Responses on a session arrive in request order; anything that
        // does not match the awaited id is a leftover and is skipped.
        let expected = serde_json::json!(id);
        loop {
            let response = self.transport.next_response(self.config.timeout).await?;
            if response.id != expected {
                debug!(?response.id, "skipping stale response");
                continue;
            }

            if let Some(error) = response.error {
                return Err(SdkError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(response.result.unwrap_or(serde_json::Value::Null));
        }
    }

    async fn notify(&mut self, method: &str, params: Option<serde_json::Value>) -> SdkResult<()> {
        self.post(&JsonRpcRequest::notification(method, params)).await
    }

    async fn post(&self, message: &JsonRpcRequest) -> SdkResult<()> {
        let response = self
            .http
            .post(self.transport.messages_url().clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::Transport {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Builder for creating a CambistClient.
pub struct CambistClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    client_name: Option<String>,
}

impl CambistClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            client_name: None,
        }
    }

    /// Set the base URL of the Cambist server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the handshake and per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the client name reported during initialization.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> SdkResult<CambistClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| SdkError::Protocol("base_url is required".to_string()))?;
        let base_url = Url::parse(&base_url_str)?;

        let mut config = ClientConfig::new(base_url);
        config.timeout = self.timeout;
        if let Some(name) = self.client_name {
            config.client_name = name;
        }

        Ok(CambistClient { config })
    }
}

impl Default for CambistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_base_url() {
        assert!(CambistClient::builder().build().is_err());
    }

    #[test]
    fn builder_rejects_invalid_urls() {
        let result = CambistClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(SdkError::InvalidUrl(_))));
    }

    #[test]
    fn builder_applies_overrides() {
        let client = CambistClient::builder()
            .base_url("http://localhost:8081")
            .timeout(Duration::from_secs(5))
            .client_name("test-agent")
            .build()
            .unwrap();

        assert_eq!(client.config.timeout, Duration::from_secs(5));
        assert_eq!(client.config.client_name, "test-agent");
    }
}
