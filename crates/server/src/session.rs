//! Per-connection session bookkeeping for the SSE transport.
//!
//! Each open SSE stream gets a session: an inbound queue drained by a
//! dedicated worker task (so invocations on one connection are processed
//! strictly in arrival order) and an outbound channel feeding the stream.
//! Sessions are independent; a slow upstream call stalls only its own
//! worker.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cambist_mcp::protocol::JsonRpcResponse;
use cambist_mcp::McpService;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Bound on queued-but-unprocessed messages per session.
const SESSION_QUEUE_DEPTH: usize = 32;

/// Why a message could not be handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// No session with that id (never opened, or already closed).
    UnknownSession,
    /// The session's inbound queue is full.
    Busy,
}

struct SessionHandle {
    inbound: mpsc::Sender<String>,
}

/// Registry of live SSE sessions.
///
/// The lock guards only the map itself; no lock is held across any await
/// point or while a message is processed.
pub struct SessionRegistry {
    service: Arc<McpService>,
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(service: Arc<McpService>) -> Self {
        Self {
            service,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session: registers it and spawns its worker. Returns the
    /// session id and the outbound end the SSE stream drains.
    pub fn open(&self) -> (Uuid, mpsc::Receiver<JsonRpcResponse>) {
        let session_id = Uuid::new_v4();
        let (inbound_tx, mut inbound_rx) = mpsc::channel::<String>(SESSION_QUEUE_DEPTH);
        let (outbound_tx, outbound_rx) = mpsc::channel::<JsonRpcResponse>(SESSION_QUEUE_DEPTH);

        let service = self.service.clone();
        tokio::spawn(async move {
            while let Some(raw) = inbound_rx.recv().await {
                if let Some(response) = service.handle_message(&raw).await {
                    if outbound_tx.send(response).await.is_err() {
                        // Stream is gone; nothing left to answer to.
                        break;
                    }
                }
            }
            debug!(%session_id, "session worker finished");
        });

        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(session_id, SessionHandle { inbound: inbound_tx });

        (session_id, outbound_rx)
    }

    /// Queue one raw JSON-RPC message for a session.
    pub fn dispatch(&self, session_id: &Uuid, payload: String) -> Result<(), DispatchError> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        let handle = sessions.get(session_id).ok_or(DispatchError::UnknownSession)?;

        handle.inbound.try_send(payload).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DispatchError::Busy,
            mpsc::error::TrySendError::Closed(_) => DispatchError::UnknownSession,
        })
    }

    /// Close a session. Dropping the inbound sender lets the worker drain
    /// what is already queued and exit.
    pub fn close(&self, session_id: &Uuid) {
        if self
            .sessions
            .write()
            .expect("session lock poisoned")
            .remove(session_id)
            .is_some()
        {
            debug!(%session_id, "session closed");
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().expect("session lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cambist_mcp::tools::ToolRegistry;

    fn registry() -> SessionRegistry {
        let service = Arc::new(McpService::new("cambist", "0.0.0", ToolRegistry::new()));
        SessionRegistry::new(service)
    }

    #[tokio::test]
    async fn dispatch_to_unknown_session_is_rejected() {
        let registry = registry();
        let err = registry
            .dispatch(&Uuid::new_v4(), "{}".to_string())
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownSession);
    }

    #[tokio::test]
    async fn worker_answers_requests_in_order() {
        let registry = registry();
        let (session_id, mut outbound) = registry.open();

        registry
            .dispatch(
                &session_id,
                r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
            )
            .unwrap();
        registry
            .dispatch(
                &session_id,
                r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#.to_string(),
            )
            .unwrap();

        let first = outbound.recv().await.unwrap();
        let second = outbound.recv().await.unwrap();
        assert_eq!(first.id, serde_json::json!(1));
        assert_eq!(second.id, serde_json::json!(2));
    }

    #[tokio::test]
    async fn close_forgets_the_session() {
        let registry = registry();
        let (session_id, _outbound) = registry.open();
        assert_eq!(registry.active_sessions(), 1);

        registry.close(&session_id);
        assert_eq!(registry.active_sessions(), 0);
        assert!(registry.dispatch(&session_id, "{}".to_string()).is_err());
    }
}
