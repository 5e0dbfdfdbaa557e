//! The popup: two user actions over the collector and exporter.
//!
//! Each action moves `Idle -> Collecting|Exporting -> Idle`. Failures set an
//! error banner that stays until the next action that does not fail.

use crate::collector::Collector;
use crate::error::{HeapError, Result};
use crate::export::Exporter;
use crate::holder::HolderHandle;
use crate::platform::ActiveTab;
use std::sync::Arc;

pub const EMPTY_BUFFER_MESSAGE: &str = "No cookies collected yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Idle,
    Collecting,
    Exporting,
}

/// What the popup shows after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(err: &HeapError) -> Self {
        Self {
            message: format!("Error: {}", err),
            is_error: true,
        }
    }
}

pub struct Popup {
    tab: Arc<dyn ActiveTab>,
    holder: HolderHandle,
    collector: Collector,
    exporter: Exporter,
    state: PopupState,
    banner: Option<String>,
    count: usize,
}

impl Popup {
    pub fn new(
        tab: Arc<dyn ActiveTab>,
        holder: HolderHandle,
        collector: Collector,
        exporter: Exporter,
    ) -> Self {
        Self {
            tab,
            holder,
            collector,
            exporter,
            state: PopupState::Idle,
            banner: None,
            count: 0,
        }
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    /// Current error banner, if the last failing action has not been
    /// followed by a successful one.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Cookie count as last observed by the popup
    pub fn count(&self) -> usize {
        self.count
    }

    /// Re-reads the buffer size from the holder.
    pub async fn refresh_count(&mut self) -> Result<usize> {
        self.count = self.holder.read_all().await?.len();
        Ok(self.count)
    }

    /// The "get cookies" button.
    pub async fn get_cookies(&mut self) -> Notice {
        self.state = PopupState::Collecting;
        let result = self.collector.handle_get_cookies(self.tab.as_ref()).await;
        self.state = PopupState::Idle;

        match result {
            Ok(outcome) => {
                self.banner = None;
                self.count = outcome.total();
                Notice::info(outcome.to_string())
            }
            Err(err) => self.fail(err),
        }
    }

    /// The "copy to clipboard" button.
    pub async fn copy_to_clipboard(&mut self) -> Notice {
        self.state = PopupState::Exporting;
        let result = self.exporter.handle_copy_to_clipboard().await;
        self.state = PopupState::Idle;

        match result {
            Ok(count) => {
                self.banner = None;
                self.count = 0;
                Notice::info(format!("Copied {} cookies to clipboard", count))
            }
            Err(HeapError::EmptyBuffer) => {
                self.banner = None;
                self.count = 0;
                Notice::info(EMPTY_BUFFER_MESSAGE)
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: HeapError) -> Notice {
        if err.is_collaborator() {
            log::warn!("{}", err);
        } else {
            log::error!("{}", err);
        }
        let notice = Notice::error(&err);
        self.banner = Some(notice.message.clone());
        notice
    }
}
