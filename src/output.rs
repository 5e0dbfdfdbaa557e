//! Output formatting and display utilities

use crate::config::OutputConfig;
use crate::error::Result;
use crate::platform::ClipboardSink;
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::Path;

/// Export destination used instead of the clipboard: a file or stdout
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write content to configured output
    pub fn write(&self, content: &str) -> Result<()> {
        if let Some(file_path) = &self.config.file {
            self.write_to_file(content, file_path)
        } else {
            self.write_to_stdout(content)
        }
    }

    /// Status line for the user, on stderr
    pub fn write_notice(&self, message: &str) {
        if !self.config.silent {
            eprintln!("{}", message);
        }
    }

    /// Write error message
    pub fn write_error(&self, message: &str) {
        if !self.config.silent {
            eprintln!("cookieheap: error: {}", message);
        }
    }

    fn write_to_file(&self, content: &str, file_path: &Path) -> Result<()> {
        std::fs::write(file_path, content.as_bytes())?;
        Ok(())
    }

    fn write_to_stdout(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

#[async_trait]
impl ClipboardSink for OutputWriter {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.write(text)
    }
}

#[cfg(test)]
mod tests;
