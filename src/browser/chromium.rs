//! Chrome/Chromium family cookie extraction

use crate::browser::{
    column_error, keyring, open_database_copy, read_columns, resolve_cookie_database,
};
use crate::config::{Browser, BrowserCookieConfig};
use crate::cookie::StoreCookie;
use crate::error::{HeapError, Result};
use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rusqlite::{Connection, Row};
use sha1::Sha1;
use std::cell::OnceCell;
use std::path::PathBuf;

const KEY_DERIVE_SALT: &[u8] = b"saltysalt";
const KEY_LENGTH: usize = 16;
const AES_IV: &[u8; 16] = b"                ";
const LINUX_V10_PASSWORD: &[u8] = b"peanuts";
const HASH_PREFIX_META_VERSION: i64 = 24;
const HASH_PREFIX_LEN: usize = 32;
const WINDOWS_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
const STORE_ID: &str = "0";

#[cfg(target_os = "macos")]
const KEY_DERIVE_ITERATIONS: u32 = 1003;
#[cfg(not(target_os = "macos"))]
const KEY_DERIVE_ITERATIONS: u32 = 1;

/// Read every cookie of a Chromium-family browser profile
pub fn extract_cookies(config: &BrowserCookieConfig) -> Result<Vec<StoreCookie>> {
    let roots = vec![user_data_dir(config.browser)?];
    let cookie_db = resolve_cookie_database(&roots, config.profile.as_deref(), "Cookies")?;
    log::info!("Reading {} cookies from {:?}", config.browser, cookie_db);

    let (_temp_dir, conn) = open_database_copy(&cookie_db)?;
    let browser = config.browser;
    let decryptor =
        CookieDecryptor::new(read_meta_version(&conn), config.safe_storage_password.as_deref())
            .with_keyring(Box::new(move || keyring::safe_storage_password(browser)));
    read_cookies(&conn, &decryptor)
}

fn user_data_dir(browser: Browser) -> Result<PathBuf> {
    let (linux, macos, windows) = match browser {
        Browser::Chrome => ("google-chrome", "Google/Chrome", "Google/Chrome/User Data"),
        Browser::Chromium => ("chromium", "Chromium", "Chromium/User Data"),
        Browser::Edge => ("microsoft-edge", "Microsoft Edge", "Microsoft/Edge/User Data"),
        Browser::Brave => (
            "BraveSoftware/Brave-Browser",
            "BraveSoftware/Brave-Browser",
            "BraveSoftware/Brave-Browser/User Data",
        ),
        Browser::Opera => ("opera", "com.operasoftware.Opera", "Opera Software/Opera Stable"),
        Browser::Vivaldi => ("vivaldi", "Vivaldi", "Vivaldi/User Data"),
        Browser::Whale => ("naver-whale", "Naver/Whale", "Naver/Naver Whale/User Data"),
        Browser::Firefox => {
            return Err(HeapError::Unsupported(
                "Firefox is not a Chromium browser".to_string(),
            ))
        }
    };

    let base = if cfg!(target_os = "windows") {
        dirs::data_local_dir().map(|dir| dir.join(windows))
    } else if cfg!(target_os = "macos") {
        dirs::config_dir().map(|dir| dir.join(macos))
    } else {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join(linux))
    };
    base.ok_or_else(|| HeapError::Config("Cannot determine browser data directory".to_string()))
}

fn read_meta_version(conn: &Connection) -> i64 {
    let result: std::result::Result<String, _> =
        conn.query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
            row.get(0)
        });
    result
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn read_cookies(conn: &Connection, decryptor: &CookieDecryptor) -> Result<Vec<StoreCookie>> {
    let columns = read_columns(conn, "cookies")?;
    let pick = |candidates: &[&'static str], fallback: &'static str| -> &'static str {
        candidates
            .iter()
            .copied()
            .find(|name| columns.contains(*name))
            .unwrap_or(fallback)
    };
    let secure = pick(&["is_secure", "secure"], "0");
    let http_only = pick(&["is_httponly", "httponly"], "0");
    let same_site = pick(&["samesite"], "-1");
    let persistent = pick(&["is_persistent", "has_expires"], "1");

    let query = format!(
        "SELECT host_key, name, value, encrypted_value, path, expires_utc, {}, {}, {}, {} FROM cookies",
        secure, http_only, same_site, persistent
    );
    let mut stmt = conn
        .prepare(&query)
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to prepare cookie query: {}", e)))?;
    let mut rows = stmt
        .query([])
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to query cookies: {}", e)))?;

    let mut cookies = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to read cookie row: {}", e)))?
    {
        if let Some(cookie) = row_to_cookie(row, decryptor)? {
            cookies.push(cookie);
        }
    }
    Ok(cookies)
}

fn row_to_cookie(row: &Row<'_>, decryptor: &CookieDecryptor) -> Result<Option<StoreCookie>> {
    let host_key: String = row.get(0).map_err(column_error("host"))?;
    let name: String = row.get(1).map_err(column_error("name"))?;
    let value: String = row.get(2).map_err(column_error("value"))?;
    let encrypted_value = read_encrypted_value(row)?;
    let path: String = row.get(4).map_err(column_error("path"))?;
    let expires_utc: i64 = row.get(5).map_err(column_error("expiry"))?;
    let secure: i64 = row.get(6).map_err(column_error("secure flag"))?;
    let http_only: i64 = row.get(7).map_err(column_error("httponly flag"))?;
    let same_site: i64 = row.get(8).map_err(column_error("samesite"))?;
    let persistent: i64 = row.get(9).map_err(column_error("persistence flag"))?;

    let cookie_value = if !value.is_empty() || encrypted_value.is_empty() {
        value
    } else {
        match decryptor.decrypt(&encrypted_value) {
            Some(value) => value,
            None => {
                log::warn!("Skipping cookie {} on {}: cannot decrypt", name, host_key);
                return Ok(None);
            }
        }
    };

    let expires = if persistent != 0 {
        chromium_expires_to_unix_seconds(expires_utc)
    } else {
        None
    };

    Ok(Some(StoreCookie {
        host_only: Some(!host_key.starts_with('.')),
        name,
        domain: host_key,
        value: Some(cookie_value),
        path: Some(path),
        secure: Some(secure != 0),
        http_only: Some(http_only != 0),
        same_site: Some(same_site_label(same_site).to_string()),
        store_id: Some(STORE_ID.to_string()),
        expiration_date: expires.map(|seconds| seconds as f64),
        session: Some(expires.is_none()),
        extra: Default::default(),
    }))
}

fn read_encrypted_value(row: &Row<'_>) -> Result<Vec<u8>> {
    let value = row.get_ref(3).map_err(|e| {
        HeapError::BrowserCookie(format!("Failed to read cookie ciphertext: {}", e))
    })?;
    match value {
        rusqlite::types::ValueRef::Blob(bytes) => Ok(bytes.to_vec()),
        rusqlite::types::ValueRef::Text(text) => Ok(text.to_vec()),
        rusqlite::types::ValueRef::Null => Ok(Vec::new()),
        _ => Err(HeapError::BrowserCookie(
            "Unsupported cookie ciphertext type".to_string(),
        )),
    }
}

/// Names used by browser cookie APIs for Chromium's samesite column
fn same_site_label(value: i64) -> &'static str {
    match value {
        0 => "no_restriction",
        1 => "lax",
        2 => "strict",
        _ => "unspecified",
    }
}

fn chromium_expires_to_unix_seconds(expires_utc: i64) -> Option<i64> {
    if expires_utc == 0 {
        return None;
    }
    let unix_seconds = (expires_utc / 1_000_000) - WINDOWS_EPOCH_OFFSET_SECS;
    if unix_seconds <= 0 {
        None
    } else {
        Some(unix_seconds)
    }
}

/// Password source for the keyring key, consulted on first use
type KeyringLookup = Box<dyn Fn() -> Option<Vec<u8>>>;

struct CookieDecryptor {
    password_key: Option<[u8; KEY_LENGTH]>,
    v10_key: [u8; KEY_LENGTH],
    empty_key: [u8; KEY_LENGTH],
    keyring: Option<KeyringLookup>,
    keyring_key: OnceCell<Option<[u8; KEY_LENGTH]>>,
    meta_version: i64,
}

impl CookieDecryptor {
    /// A decryptor that never reads the OS keyring
    fn new(meta_version: i64, safe_storage_password: Option<&str>) -> Self {
        Self {
            password_key: safe_storage_password.map(|password| derive_key(password.as_bytes())),
            v10_key: derive_key(LINUX_V10_PASSWORD),
            empty_key: derive_key(b""),
            keyring: None,
            keyring_key: OnceCell::new(),
            meta_version,
        }
    }

    /// Falls back to `lookup` for the Safe Storage password the first time a
    /// value needs it.
    fn with_keyring(mut self, lookup: KeyringLookup) -> Self {
        self.keyring = Some(lookup);
        self
    }

    fn keyring_key(&self) -> Option<[u8; KEY_LENGTH]> {
        *self.keyring_key.get_or_init(|| {
            let lookup = self.keyring.as_ref()?;
            lookup().map(|password| derive_key(&password))
        })
    }

    fn decrypt(&self, encrypted_value: &[u8]) -> Option<String> {
        if encrypted_value.len() < 3 {
            return None;
        }
        let (version, ciphertext) = encrypted_value.split_at(3);
        // A supplied password overrides the keyring
        let mut keys: Vec<[u8; KEY_LENGTH]> = self.password_key.into_iter().collect();
        match version {
            b"v10" => {
                // macOS encrypts v10 with the keychain password
                if cfg!(target_os = "macos") && self.password_key.is_none() {
                    keys.extend(self.keyring_key());
                }
                keys.push(self.v10_key);
            }
            b"v11" => {
                if self.password_key.is_none() {
                    keys.extend(self.keyring_key());
                }
            }
            _ => {
                log::warn!("Unknown Chrome cookie version: {:?}", version);
                return None;
            }
        }
        keys.push(self.empty_key);
        let hash_prefix = self.meta_version >= HASH_PREFIX_META_VERSION;

        for key in &keys {
            let Ok(decrypted) = decrypt_aes_cbc(ciphertext, key) else {
                continue;
            };
            let trimmed = if hash_prefix && decrypted.len() >= HASH_PREFIX_LEN {
                &decrypted[HASH_PREFIX_LEN..]
            } else {
                &decrypted[..]
            };
            if let Ok(value) = String::from_utf8(trimmed.to_vec()) {
                return Some(value);
            }
        }
        None
    }
}

fn derive_key(password: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha1>(password, KEY_DERIVE_SALT, KEY_DERIVE_ITERATIONS, &mut key);
    key
}

fn decrypt_aes_cbc(ciphertext: &[u8], key: &[u8; KEY_LENGTH]) -> Result<Vec<u8>> {
    let mut buffer = ciphertext.to_vec();
    let decryptor = cbc::Decryptor::<Aes128>::new_from_slices(key, AES_IV)
        .map_err(|e| HeapError::BrowserCookie(format!("Failed to create AES decryptor: {}", e)))?;
    let plaintext = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| HeapError::BrowserCookie("Failed to decrypt cookie".to_string()))?;
    Ok(plaintext.to_vec())
}
