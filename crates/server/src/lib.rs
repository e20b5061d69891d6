// Cambist tool server: MCP over SSE (axum) with session bookkeeping.
// The binary in main.rs wires configuration and transport selection.

pub mod api;
pub mod config;
pub mod session;

pub use config::{AppState, ServerConfig, Transport};
