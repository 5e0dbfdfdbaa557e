//! Contracts for the platform services the collector and exporter call.

use crate::cookie::StoreCookie;
use crate::error::{HeapError, Result};
use crate::utils::UrlUtils;
use async_trait::async_trait;
use std::sync::RwLock;
use url::Url;

/// Looks up the page the user is currently looking at.
#[async_trait]
pub trait ActiveTab: Send + Sync {
    async fn active_url(&self) -> Result<Url>;
}

/// A cookie store answering domain filter queries.
#[async_trait]
pub trait CookieSource: Send + Sync {
    /// Cookies whose domain matches `domain` the way browser cookie APIs
    /// match a `domain` filter.
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<StoreCookie>>;
}

/// Destination for exported text.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Active tab backed by whatever URL the user last opened.
#[derive(Debug, Default)]
pub struct FixedTab {
    url: RwLock<Option<Url>>,
}

impl FixedTab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: Url) -> Self {
        Self {
            url: RwLock::new(Some(url)),
        }
    }

    /// Validates `input` and makes it the active page.
    pub fn open(&self, input: &str) -> Result<Url> {
        let url = UrlUtils::validate_url(input)?;
        let mut current = self
            .url
            .write()
            .map_err(|_| HeapError::ActiveTab("Active tab state poisoned".to_string()))?;
        *current = Some(url.clone());
        Ok(url)
    }
}

#[async_trait]
impl ActiveTab for FixedTab {
    async fn active_url(&self) -> Result<Url> {
        let current = self
            .url
            .read()
            .map_err(|_| HeapError::ActiveTab("Active tab state poisoned".to_string()))?;
        current
            .clone()
            .ok_or_else(|| HeapError::ActiveTab("No page is open".to_string()))
    }
}
