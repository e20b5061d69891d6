//! SSE side of the MCP transport.
//!
//! The server's stream opens with an `endpoint` event naming the URL to POST
//! messages to; every JSON-RPC response then arrives as a `message` event.
//! A background task reads the stream and routes events; the transport owns
//! that task and aborts it on drop.

use std::time::Duration;

use cambist_mcp::protocol::JsonRpcResponse;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::error::{SdkError, SdkResult};

/// Buffered responses not yet consumed by the caller.
const RESPONSE_QUEUE_DEPTH: usize = 32;

pub struct SseTransport {
    messages_url: Url,
    responses: mpsc::Receiver<JsonRpcResponse>,
    reader: JoinHandle<()>,
}

impl SseTransport {
    /// Open the stream and wait for the server to name its message endpoint.
    pub async fn connect(sse_url: Url, timeout: Duration) -> SdkResult<Self> {
        let events = EventSource::get(sse_url.clone());

        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let (response_tx, responses) = mpsc::channel(RESPONSE_QUEUE_DEPTH);
        let reader = tokio::spawn(read_events(events, endpoint_tx, response_tx));

        let endpoint = tokio::time::timeout(timeout, endpoint_rx)
            .await
            .map_err(|_| SdkError::Timeout)?
            .map_err(|_| SdkError::Closed)?;
        let messages_url = sse_url.join(&endpoint)?;

        Ok(Self {
            messages_url,
            responses,
            reader,
        })
    }

    /// URL the caller POSTs JSON-RPC messages to.
    pub fn messages_url(&self) -> &Url {
        &self.messages_url
    }

    /// Next JSON-RPC response from the stream.
    pub async fn next_response(&mut self, timeout: Duration) -> SdkResult<JsonRpcResponse> {
        tokio::time::timeout(timeout, self.responses.recv())
            .await
            .map_err(|_| SdkError::Timeout)?
            .ok_or(SdkError::Closed)
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_events(
    mut events: EventSource,
    endpoint_tx: oneshot::Sender<String>,
    responses: mpsc::Sender<JsonRpcResponse>,
) {
    let mut endpoint_tx = Some(endpoint_tx);

    while let Some(event) = events.next().await {
        match event {
            Ok(Event::Open) => {}
            Ok(Event::Message(message)) => match message.event.as_str() {
                "endpoint" => {
                    if let Some(tx) = endpoint_tx.take() {
                        let _ = tx.send(message.data);
                    }
                }
                "message" => match serde_json::from_str::<JsonRpcResponse>(&message.data) {
                    Ok(response) => {
                        if responses.send(response).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "discarding unparseable message event");
                    }
                },
                other => {
                    debug!(event = other, "ignoring unrecognized event");
                }
            },
            Err(err) => {
                // A new EventSource attempt would land in a fresh session;
                // this connection is done.
                debug!(error = %err, "event stream terminated");
                events.close();
                break;
            }
        }
    }
}
