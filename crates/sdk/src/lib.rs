//! # Cambist SDK
//!
//! Client for the Cambist currency-conversion tool server (MCP over SSE).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cambist_sdk::{CambistClient, SdkResult};
//!
//! #[tokio::main]
//! async fn main() -> SdkResult<()> {
//!     let client = CambistClient::builder()
//!         .base_url("http://localhost:8081")
//!         .build()?;
//!
//!     // Handshake: open the stream, initialize, discover the contract
//!     let mut connection = client.connect().await?;
//!     connection.initialize().await?;
//!     let tools = connection.list_tools().await?;
//!     println!("Server exposes {} tool(s)", tools.len());
//!
//!     // One invocation per conversion; the stream stays open for more
//!     let text = connection.convert(100.0, "USD", "EUR").await?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{CambistClient, CambistClientBuilder, McpConnection};
pub use config::ClientConfig;
pub use error::{SdkError, SdkResult};

// Re-export the protocol types callers interact with
pub use cambist_mcp::protocol::{CallToolResult, InitializeResult, TextContent, ToolSchema};
