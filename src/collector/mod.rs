//! Cookie collection for the active page
//!
//! Collection queries the cookie source once per domain variant of the page
//! host, cleans what comes back, and merges it into the holder's buffer.

use crate::cookie::{CookieRecord, StoreCookie};
use crate::error::{HeapError, Result};
use crate::holder::HolderHandle;
use crate::platform::{ActiveTab, CookieSource};
use crate::utils::UrlUtils;
use futures_util::future::join_all;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub mod merge;
pub mod variants;

pub use merge::merge_and_dedupe;
pub use variants::derive_domain_variants;

/// Result of one collection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The buffer grew and was written back.
    Added { added: usize, total: usize },
    /// Nothing with a new identity turned up; the buffer was not touched.
    NothingNew { total: usize },
}

impl CollectOutcome {
    pub fn total(&self) -> usize {
        match self {
            CollectOutcome::Added { total, .. } | CollectOutcome::NothingNew { total } => *total,
        }
    }
}

impl fmt::Display for CollectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectOutcome::Added { added, total } => {
                write!(f, "Collected {} new cookies ({} total)", added, total)
            }
            CollectOutcome::NothingNew { total } => {
                write!(f, "No new cookies found ({} total)", total)
            }
        }
    }
}

/// Strips store-only attributes and records the page origin.
pub fn clean(cookie: StoreCookie, page_url: &Url) -> CookieRecord {
    CookieRecord::from_store(cookie, UrlUtils::origin(page_url))
}

/// Collects cookies for pages into a holder
#[derive(Clone)]
pub struct Collector {
    source: Arc<dyn CookieSource>,
    holder: HolderHandle,
}

impl Collector {
    pub fn new(source: Arc<dyn CookieSource>, holder: HolderHandle) -> Self {
        Self { source, holder }
    }

    /// Cookies for one exact domain filter
    pub async fn fetch_for_domain(&self, domain: &str) -> Result<Vec<StoreCookie>> {
        self.source.cookies_for_domain(domain).await
    }

    /// Every cookie visible to `page_url` and its parent domains, cleaned and
    /// deduplicated.
    ///
    /// One task runs per domain variant. Results are folded in variant order
    /// once all tasks finish, so when two variants return the same identity
    /// the later variant wins regardless of completion order.
    pub async fn collect_all(&self, page_url: &Url) -> Result<Vec<CookieRecord>> {
        let host = UrlUtils::host(page_url)?;
        let variants = derive_domain_variants(&host);
        log::debug!("Querying {} domain variants for {}", variants.len(), host);

        let tasks = variants.iter().map(|domain| {
            let collector = self.clone();
            let domain = domain.clone();
            tokio::spawn(async move { collector.fetch_for_domain(&domain).await })
        });
        let results = join_all(tasks).await;

        let mut collected = Vec::new();
        for (domain, joined) in variants.iter().zip(results) {
            let cookies = joined.map_err(|e| {
                HeapError::BrowserCookie(format!("Cookie query for {} failed: {}", domain, e))
            })??;
            log::debug!("{} cookies for {}", cookies.len(), domain);
            collected.extend(cookies.into_iter().map(|cookie| clean(cookie, page_url)));
        }

        Ok(merge_and_dedupe(Vec::new(), collected))
    }

    /// Collects for the active page and merges into the holder's buffer.
    ///
    /// The buffer is only written when the merge adds a new identity.
    pub async fn handle_get_cookies(&self, tab: &dyn ActiveTab) -> Result<CollectOutcome> {
        let page_url = tab.active_url().await?;
        let collected = self.collect_all(&page_url).await?;
        let existing = self.holder.read_all().await?;
        let before = existing.len();

        let merged = merge_and_dedupe(existing, collected);
        let total = merged.len();
        if total <= before {
            log::info!("No new cookies for {}", page_url);
            return Ok(CollectOutcome::NothingNew { total: before });
        }

        self.holder.replace_all(merged).await?;
        log::info!(
            "Collected {} new cookies for {} ({} total)",
            total - before,
            page_url,
            total
        );
        Ok(CollectOutcome::Added {
            added: total - before,
            total,
        })
    }
}
