//! Exporting the collected buffer as JSON

use crate::config::KeyCase;
use crate::cookie::CookieRecord;
use crate::error::{HeapError, Result};
use crate::holder::HolderHandle;
use crate::platform::ClipboardSink;
use std::sync::Arc;

pub mod casing;

pub use casing::{convert_key, transform_keys};

/// Pretty JSON for `records` with keys rewritten to `key_case`.
pub fn render_json(records: &[CookieRecord], key_case: KeyCase) -> Result<String> {
    let value = transform_keys(serde_json::to_value(records)?, key_case);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Copies the holder's buffer to a clipboard sink
#[derive(Clone)]
pub struct Exporter {
    holder: HolderHandle,
    clipboard: Arc<dyn ClipboardSink>,
    key_case: KeyCase,
}

impl Exporter {
    pub fn new(holder: HolderHandle, clipboard: Arc<dyn ClipboardSink>, key_case: KeyCase) -> Self {
        Self {
            holder,
            clipboard,
            key_case,
        }
    }

    /// Writes the buffer to the clipboard and empties it.
    ///
    /// An empty buffer is reported as [`HeapError::EmptyBuffer`] without
    /// touching the clipboard. The buffer is only cleared after the clipboard
    /// write succeeded. Returns the number of exported cookies.
    pub async fn handle_copy_to_clipboard(&self) -> Result<usize> {
        let records = self.holder.read_all().await?;
        if records.is_empty() {
            return Err(HeapError::EmptyBuffer);
        }

        let json = render_json(&records, self.key_case)?;
        self.clipboard.write_text(&json).await?;
        self.holder.replace_all(Vec::new()).await?;
        log::info!("Exported {} cookies", records.len());
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{render_json, Exporter};
    use crate::config::KeyCase;
    use crate::cookie::{CookieRecord, StoreCookie};
    use crate::error::{HeapError, Result};
    use crate::holder::spawn_holder;
    use crate::platform::ClipboardSink;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ClipboardSink for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(HeapError::Clipboard("clipboard unavailable".to_string()));
            }
            self.writes.lock().expect("lock").push(text.to_string());
            Ok(())
        }
    }

    fn record(name: &str) -> CookieRecord {
        let mut cookie = StoreCookie::new(name, ".example.com").with_value("v");
        cookie.http_only = Some(true);
        CookieRecord::from_store(cookie, "https://example.com")
    }

    #[tokio::test]
    async fn empty_buffer_skips_clipboard() {
        let holder = spawn_holder();
        let clipboard = Arc::new(RecordingClipboard::default());
        let exporter = Exporter::new(holder.clone(), clipboard.clone(), KeyCase::AsIs);

        let err = exporter.handle_copy_to_clipboard().await.expect_err("empty");
        assert!(matches!(err, HeapError::EmptyBuffer));
        assert!(clipboard.writes.lock().expect("lock").is_empty());
        assert!(holder.read_all().await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn successful_copy_clears_buffer() {
        let holder = spawn_holder();
        holder
            .replace_all(vec![record("a"), record("b")])
            .await
            .expect("seed");
        let clipboard = Arc::new(RecordingClipboard::default());
        let exporter = Exporter::new(holder.clone(), clipboard.clone(), KeyCase::AsIs);

        let count = exporter.handle_copy_to_clipboard().await.expect("copy");
        assert_eq!(count, 2);
        assert!(holder.read_all().await.expect("read").is_empty());

        let writes = clipboard.writes.lock().expect("lock");
        let exported: Vec<CookieRecord> = serde_json::from_str(&writes[0]).expect("json");
        assert_eq!(exported, vec![record("a"), record("b")]);
    }

    #[tokio::test]
    async fn failed_copy_keeps_buffer() {
        let holder = spawn_holder();
        holder.replace_all(vec![record("a")]).await.expect("seed");
        let clipboard = Arc::new(RecordingClipboard {
            fail: true,
            ..RecordingClipboard::default()
        });
        let exporter = Exporter::new(holder.clone(), clipboard, KeyCase::AsIs);

        let err = exporter.handle_copy_to_clipboard().await.expect_err("fails");
        assert!(matches!(err, HeapError::Clipboard(_)));
        assert_eq!(holder.read_all().await.expect("read"), vec![record("a")]);
    }

    #[test]
    fn render_json_applies_key_case() {
        let json = render_json(&[record("a")], KeyCase::Snake).expect("render");
        assert!(json.contains("\"http_only\": true"));
        assert!(!json.contains("httpOnly"));
        assert!(json.starts_with('['));
    }
}
