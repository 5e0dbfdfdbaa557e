//! System clipboard access.
//!
//! On Linux the clipboard is owned by the writing process: its contents are
//! served only while an `arboard::Clipboard` is alive. One owner thread keeps
//! the clipboard open for as long as the sink lives, and a one-shot export
//! waits until another client takes the selection over before returning.

use crate::error::{HeapError, Result};
use crate::platform::ClipboardSink;
use async_trait::async_trait;
use std::sync::{mpsc, Mutex};
use std::thread;
use tokio::sync::oneshot;

struct ClipboardRequest {
    text: String,
    reply: oneshot::Sender<Result<()>>,
}

/// The desktop clipboard, through `arboard`
#[derive(Default)]
pub struct SystemClipboard {
    wait_until_replaced: bool,
    owner: Mutex<Option<mpsc::Sender<ClipboardRequest>>>,
}

impl SystemClipboard {
    /// Clipboard for a long-running session
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard for a process that exits right after writing.
    ///
    /// On Linux each write blocks until another application replaces the
    /// contents.
    pub fn until_replaced() -> Self {
        Self {
            wait_until_replaced: true,
            ..Self::default()
        }
    }

    pub fn waits_until_replaced(&self) -> bool {
        self.wait_until_replaced
    }

    fn owner(&self) -> Result<mpsc::Sender<ClipboardRequest>> {
        let mut owner = self
            .owner
            .lock()
            .map_err(|_| HeapError::Clipboard("clipboard state poisoned".to_string()))?;
        if let Some(sender) = owner.as_ref() {
            return Ok(sender.clone());
        }
        let sender = spawn_owner(self.wait_until_replaced)?;
        *owner = Some(sender.clone());
        Ok(sender)
    }
}

/// The clipboard lives on this thread until every sender is gone.
fn spawn_owner(wait: bool) -> Result<mpsc::Sender<ClipboardRequest>> {
    let (sender, requests) = mpsc::channel::<ClipboardRequest>();
    thread::Builder::new()
        .name("clipboard".to_string())
        .spawn(move || {
            let mut clipboard = None;
            for request in requests {
                let result = copy_to_clipboard(&mut clipboard, request.text, wait);
                let _ = request.reply.send(result);
            }
            log::debug!("Clipboard owner stopped");
        })
        .map_err(|e| HeapError::Clipboard(format!("clipboard thread: {}", e)))?;
    Ok(sender)
}

fn copy_to_clipboard(
    clipboard: &mut Option<arboard::Clipboard>,
    text: String,
    wait: bool,
) -> Result<()> {
    if clipboard.is_none() {
        let opened = arboard::Clipboard::new()
            .map_err(|e| HeapError::Clipboard(format!("clipboard init: {}", e)))?;
        *clipboard = Some(opened);
    }
    let clipboard = clipboard
        .as_mut()
        .ok_or_else(|| HeapError::Clipboard("clipboard unavailable".to_string()))?;
    set_text(clipboard, text, wait)
        .map_err(|e| HeapError::Clipboard(format!("clipboard set: {}", e)))
}

#[cfg(target_os = "linux")]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: String,
    wait: bool,
) -> std::result::Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    let set = clipboard.set();
    if wait {
        log::info!("Holding the clipboard until another application takes it");
        set.wait().text(text)
    } else {
        set.text(text)
    }
}

#[cfg(not(target_os = "linux"))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: String,
    _wait: bool,
) -> std::result::Result<(), arboard::Error> {
    clipboard.set_text(text)
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.owner()?
            .send(ClipboardRequest {
                text: text.to_string(),
                reply,
            })
            .map_err(|_| HeapError::Clipboard("clipboard owner stopped".to_string()))?;
        response
            .await
            .map_err(|_| HeapError::Clipboard("clipboard owner stopped".to_string()))?
    }
}
