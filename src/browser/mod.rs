//! Browser cookie stores
//!
//! This module reads cookies out of browser profiles (or a JSON export) into
//! an in-memory snapshot that answers domain filter queries the way browser
//! cookie APIs do.

use crate::config::{Browser, BrowserCookieConfig};
use crate::cookie::StoreCookie;
use crate::error::{HeapError, Result};
use crate::platform::CookieSource;
use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod chromium;
pub mod firefox;
pub mod json;
pub mod keyring;

/// Cookies loaded once from a store
#[derive(Debug, Clone, Default)]
pub struct CookieSnapshot {
    cookies: Vec<StoreCookie>,
}

impl CookieSnapshot {
    pub fn new(cookies: Vec<StoreCookie>) -> Self {
        Self { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn cookies(&self) -> &[StoreCookie] {
        &self.cookies
    }

    /// Cookies matching a `domain` filter
    pub fn matching(&self, domain: &str) -> Vec<StoreCookie> {
        self.cookies
            .iter()
            .filter(|cookie| cookie.matches_domain_filter(domain))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CookieSource for CookieSnapshot {
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<StoreCookie>> {
        let cookies = self.matching(domain);
        log::debug!("{} cookies match domain filter {}", cookies.len(), domain);
        Ok(cookies)
    }
}

/// Main interface for extracting browser cookies
pub struct BrowserCookieExtractor {
    config: BrowserCookieConfig,
}

impl BrowserCookieExtractor {
    /// Create a new cookie extractor with the given configuration
    pub fn new(config: BrowserCookieConfig) -> Self {
        Self { config }
    }

    /// Load every cookie of the configured browser profile
    pub async fn extract_cookies(&self) -> Result<CookieSnapshot> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || extract_blocking(&config))
            .await
            .map_err(|e| HeapError::BrowserCookie(format!("Cookie extraction task failed: {}", e)))?
    }
}

fn extract_blocking(config: &BrowserCookieConfig) -> Result<CookieSnapshot> {
    let cookies = match config.browser {
        Browser::Firefox => firefox::extract_cookies(config)?,
        _ => chromium::extract_cookies(config)?,
    };
    log::info!("Loaded {} cookies from {}", cookies.len(), config.browser);
    Ok(CookieSnapshot::new(cookies))
}

/// Copies a browser cookie database (and its WAL) to a temp dir and opens
/// the copy, so a running browser's lock does not get in the way.
pub(crate) fn open_database_copy(cookie_db: &Path) -> Result<(TempDir, Connection)> {
    let temp_dir = tempfile::tempdir()
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to create temp dir: {}", e)))?;
    let file_name = cookie_db
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "cookies.sqlite".into());
    let temp_db = temp_dir.path().join(&file_name);
    fs::copy(cookie_db, &temp_db).map_err(|e| map_cookie_io_error(cookie_db, e))?;

    let mut wal_name = file_name;
    wal_name.push("-wal");
    let wal = cookie_db.with_file_name(&wal_name);
    if wal.is_file() {
        fs::copy(&wal, temp_dir.path().join(&wal_name)).map_err(|e| map_cookie_io_error(&wal, e))?;
    }

    let conn = Connection::open(&temp_db)
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to open cookies DB: {}", e)))?;
    Ok((temp_dir, conn))
}

fn map_cookie_io_error(path: &Path, err: std::io::Error) -> HeapError {
    match err.kind() {
        std::io::ErrorKind::NotFound => {
            HeapError::FileNotFound(format!("Cookie database not found: {:?}", path))
        }
        std::io::ErrorKind::PermissionDenied => HeapError::BrowserCookie(format!(
            "Permission denied copying cookie database {:?}: {}",
            path, err
        )),
        _ => HeapError::BrowserCookie(format!(
            "Failed to copy cookie database {:?}: {}",
            path, err
        )),
    }
}

/// Maps a row read failure to an error naming the cookie attribute
pub(crate) fn column_error(what: &'static str) -> impl Fn(rusqlite::Error) -> HeapError {
    move |e| HeapError::BrowserCookie(format!("Failed to read cookie {}: {}", what, e))
}

/// Column names of `table`
pub(crate) fn read_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to read cookie schema: {}", e)))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to read cookie schema: {}", e)))?;
    let mut columns = HashSet::new();
    for row in rows {
        let name = row
            .map_err(|e| HeapError::BrowserCookie(format!("Failed to read cookie schema: {}", e)))?;
        columns.insert(name);
    }
    if columns.is_empty() {
        return Err(HeapError::BrowserCookie(format!(
            "Cookie database has no {} table",
            table
        )));
    }
    Ok(columns)
}

/// Resolves a profile argument to the cookie database to read.
///
/// A path-like profile may name the database file itself or a directory to
/// search; a plain name is looked up under each default root.
pub(crate) fn resolve_cookie_database(
    roots: &[PathBuf],
    profile: Option<&str>,
    filename: &str,
) -> Result<PathBuf> {
    let search_roots: Vec<PathBuf> = match profile {
        Some(profile) if crate::utils::FileUtils::is_path_like(profile) => {
            let expanded = crate::utils::FileUtils::expand_path(profile)?;
            if expanded.is_file() {
                return Ok(expanded);
            }
            vec![expanded]
        }
        Some(profile) => roots.iter().map(|root| root.join(profile)).collect(),
        None => roots.to_vec(),
    };

    let existing: Vec<&PathBuf> = search_roots.iter().filter(|root| root.exists()).collect();
    if existing.is_empty() {
        return Err(HeapError::FileNotFound(format!(
            "Browser data dir not found: {:?}",
            search_roots
        )));
    }

    let candidates = existing
        .into_iter()
        .flat_map(|root| crate::utils::FileUtils::find_files(root, filename))
        .collect();
    crate::utils::FileUtils::newest_path(candidates)
        .ok_or_else(|| HeapError::FileNotFound(format!("No {} database found", filename)))
}
