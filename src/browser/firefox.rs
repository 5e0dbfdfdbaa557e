//! Firefox browser cookie extraction

use crate::browser::{column_error, open_database_copy, read_columns, resolve_cookie_database};
use crate::config::BrowserCookieConfig;
use crate::cookie::StoreCookie;
use crate::error::{HeapError, Result};
use rusqlite::{Connection, Row};
use std::path::PathBuf;

const MAX_SUPPORTED_DB_SCHEMA_VERSION: i64 = 17;
const MILLISECOND_EXPIRY_SCHEMA_VERSION: i64 = 16;
const STORE_ID: &str = "firefox-default";

/// Read every cookie of a Firefox profile
pub fn extract_cookies(config: &BrowserCookieConfig) -> Result<Vec<StoreCookie>> {
    let roots = firefox_roots()?;
    let cookie_db =
        resolve_cookie_database(&roots, config.profile.as_deref(), "cookies.sqlite")?;
    log::info!("Reading firefox cookies from {:?}", cookie_db);

    let (_temp_dir, conn) = open_database_copy(&cookie_db)?;
    read_cookies(&conn)
}

fn firefox_roots() -> Result<Vec<PathBuf>> {
    let home = dirs::home_dir()
        .ok_or_else(|| HeapError::Config("Cannot determine home directory".to_string()))?;
    let roots = if cfg!(target_os = "windows") {
        dirs::data_dir()
            .map(|dir| vec![dir.join("Mozilla/Firefox/Profiles")])
            .unwrap_or_default()
    } else if cfg!(target_os = "macos") {
        vec![home.join("Library/Application Support/Firefox/Profiles")]
    } else {
        vec![
            home.join(".mozilla/firefox"),
            home.join("snap/firefox/common/.mozilla/firefox"),
            home.join(".var/app/org.mozilla.firefox/.mozilla/firefox"),
        ]
    };
    Ok(roots)
}

fn read_schema_version(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap_or(0)
}

fn read_cookies(conn: &Connection) -> Result<Vec<StoreCookie>> {
    let schema_version = read_schema_version(conn);
    if schema_version > MAX_SUPPORTED_DB_SCHEMA_VERSION {
        log::warn!(
            "Firefox cookie DB schema version {} may be unsupported",
            schema_version
        );
    }

    let columns = read_columns(conn, "moz_cookies")?;
    let expiry = if columns.contains("expiry") {
        "expiry"
    } else if columns.contains("expires") {
        "expires"
    } else {
        return Err(HeapError::BrowserCookie(
            "Firefox cookies table missing expiry column".to_string(),
        ));
    };
    let secure = if columns.contains("isSecure") { "isSecure" } else { "0" };
    let http_only = if columns.contains("isHttpOnly") {
        "isHttpOnly"
    } else {
        "0"
    };
    let same_site = if columns.contains("sameSite") { "sameSite" } else { "0" };

    let query = format!(
        "SELECT host, name, value, path, {}, {}, {}, {} FROM moz_cookies",
        expiry, secure, http_only, same_site
    );
    let mut stmt = conn
        .prepare(&query)
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to prepare Firefox query: {}", e)))?;
    let mut rows = stmt
        .query([])
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to query Firefox cookies: {}", e)))?;

    let mut cookies = Vec::new();
    while let Some(row) = rows.next().map_err(|e| {
        HeapError::BrowserCookie(format!("Failed to read Firefox cookie row: {}", e))
    })? {
        cookies.push(row_to_cookie(row, schema_version)?);
    }
    Ok(cookies)
}

fn row_to_cookie(row: &Row<'_>, schema_version: i64) -> Result<StoreCookie> {
    let host: String = row.get(0).map_err(column_error("host"))?;
    let name: String = row.get(1).map_err(column_error("name"))?;
    let value: String = row.get(2).map_err(column_error("value"))?;
    let path: String = row.get(3).map_err(column_error("path"))?;
    let expiry: Option<i64> = row.get(4).map_err(column_error("expiry"))?;
    let secure: i64 = row.get(5).map_err(column_error("secure flag"))?;
    let http_only: i64 = row.get(6).map_err(column_error("http-only flag"))?;
    let same_site: i64 = row.get(7).map_err(column_error("samesite"))?;

    let expires = expiry
        .map(|expiry| {
            if schema_version >= MILLISECOND_EXPIRY_SCHEMA_VERSION {
                expiry / 1000
            } else {
                expiry
            }
        })
        .filter(|seconds| *seconds > 0);

    Ok(StoreCookie {
        host_only: Some(!host.starts_with('.')),
        name,
        domain: host,
        value: Some(value),
        path: Some(path),
        secure: Some(secure != 0),
        http_only: Some(http_only != 0),
        same_site: Some(same_site_label(same_site).to_string()),
        store_id: Some(STORE_ID.to_string()),
        expiration_date: expires.map(|seconds| seconds as f64),
        session: Some(expires.is_none()),
        extra: Default::default(),
    })
}

/// Names used by browser cookie APIs for Firefox's sameSite column
fn same_site_label(value: i64) -> &'static str {
    match value {
        1 => "lax",
        2 => "strict",
        _ => "no_restriction",
    }
}
