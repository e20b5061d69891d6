//! Transport layer: SSE stream consumption and message-endpoint discovery.

mod sse;

pub use sse::SseTransport;
