// MCP (Model Context Protocol) surface for the Cambist tool server.
// Protocol types, the tool registry, and transport-independent dispatch;
// the SSE transport lives in the server crate.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::{McpService, StdioServer};
