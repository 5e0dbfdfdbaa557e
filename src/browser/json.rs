//! Cookies exported as JSON by browser devtools or cookie extensions

use crate::browser::CookieSnapshot;
use crate::cookie::StoreCookie;
use crate::error::{HeapError, Result};
use crate::utils::FileUtils;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum CookieFile {
    List(Vec<StoreCookie>),
    Wrapped { cookies: Vec<StoreCookie> },
}

/// Load a cookie export: either a bare array of cookie objects or an object
/// with a `cookies` array.
pub async fn load_cookie_file(path: &Path) -> Result<CookieSnapshot> {
    FileUtils::check_file_readable(path)?;
    let data = tokio::fs::read_to_string(path).await?;
    let snapshot = parse_cookie_json(&data)?;
    log::info!("Loaded {} cookies from {:?}", snapshot.len(), path);
    Ok(snapshot)
}

pub fn parse_cookie_json(data: &str) -> Result<CookieSnapshot> {
    let file: CookieFile = serde_json::from_str(data)
        .map_err(|e| HeapError::BrowserCookie(format!("Invalid cookie JSON: {}", e)))?;
    let cookies = match file {
        CookieFile::List(cookies) => cookies,
        CookieFile::Wrapped { cookies } => cookies,
    };
    Ok(CookieSnapshot::new(cookies))
}
