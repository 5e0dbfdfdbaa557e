//! Holder of the accumulated cookie buffer.
//!
//! The buffer lives inside a single actor task. Callers talk to it with JSON
//! messages over a channel, one message handled to completion before the
//! next, so the actor is the only writer of the buffer.
//!
//! Protocol:
//! - `{"type": "getCookiesHeap"}` answers `{"value": [...]}`
//! - `{"type": "setCookiesHeap", "value": [...]}` answers `{"status": "success"}`
//!
//! Anything else is left unanswered.

use crate::cookie::CookieRecord;
use crate::error::{HeapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

const CHANNEL_CAPACITY: usize = 32;
const STATUS_SUCCESS: &str = "success";

/// Requests the holder understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HolderRequest {
    #[serde(rename = "getCookiesHeap")]
    GetCookiesHeap,
    #[serde(rename = "setCookiesHeap")]
    SetCookiesHeap { value: Vec<CookieRecord> },
}

/// Responses the holder sends back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HolderResponse {
    Heap { value: Vec<CookieRecord> },
    Status { status: String },
}

/// The buffer and its message handler, without any transport.
#[derive(Debug, Default)]
pub struct Holder {
    buffer: Vec<CookieRecord>,
}

impl Holder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &[CookieRecord] {
        &self.buffer
    }

    /// Handles one protocol message. `None` means no response is sent.
    pub fn handle(&mut self, message: Value) -> Option<Value> {
        let request: HolderRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Ignoring unrecognized holder message: {}", e);
                return None;
            }
        };

        let response = match request {
            HolderRequest::GetCookiesHeap => {
                log::debug!("Holder read: {} cookies", self.buffer.len());
                HolderResponse::Heap {
                    value: self.buffer.clone(),
                }
            }
            HolderRequest::SetCookiesHeap { value } => {
                log::debug!(
                    "Holder replace: {} -> {} cookies",
                    self.buffer.len(),
                    value.len()
                );
                self.buffer = value;
                HolderResponse::Status {
                    status: STATUS_SUCCESS.to_string(),
                }
            }
        };

        match serde_json::to_value(response) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("Failed to encode holder response: {}", e);
                None
            }
        }
    }
}

struct Envelope {
    message: Value,
    respond_to: oneshot::Sender<Value>,
}

/// Cloneable handle to a running holder actor
#[derive(Debug, Clone)]
pub struct HolderHandle {
    tx: mpsc::Sender<Envelope>,
}

/// Starts a holder with an empty buffer on the current tokio runtime.
///
/// The actor stops once every handle has been dropped.
pub fn spawn_holder() -> HolderHandle {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run_holder(Holder::new(), rx));
    HolderHandle { tx }
}

async fn run_holder(mut holder: Holder, mut rx: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = rx.recv().await {
        if let Some(response) = holder.handle(envelope.message) {
            if envelope.respond_to.send(response).is_err() {
                log::debug!("Holder caller went away before the response");
            }
        }
    }
    log::debug!("Holder stopped");
}

impl HolderHandle {
    /// Sends a raw protocol message and waits for the response.
    pub async fn request(&self, message: Value) -> Result<Value> {
        let (respond_to, response) = oneshot::channel();
        self.tx
            .send(Envelope {
                message,
                respond_to,
            })
            .await
            .map_err(|_| HeapError::Transport("Holder is not running".to_string()))?;
        response
            .await
            .map_err(|_| HeapError::Transport("No response from holder".to_string()))
    }

    /// Current buffer contents
    pub async fn read_all(&self) -> Result<Vec<CookieRecord>> {
        match self.send(HolderRequest::GetCookiesHeap).await? {
            HolderResponse::Heap { value } => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// Replaces the whole buffer with `records`
    pub async fn replace_all(&self, records: Vec<CookieRecord>) -> Result<()> {
        match self
            .send(HolderRequest::SetCookiesHeap { value: records })
            .await?
        {
            HolderResponse::Status { status } if status == STATUS_SUCCESS => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn send(&self, request: HolderRequest) -> Result<HolderResponse> {
        let response = self.request(serde_json::to_value(request)?).await?;
        serde_json::from_value(response)
            .map_err(|e| HeapError::Transport(format!("Malformed holder response: {}", e)))
    }

    /// A handle whose actor is already gone.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }
}

fn unexpected(response: HolderResponse) -> HeapError {
    HeapError::Transport(format!("Unexpected holder response: {:?}", response))
}
