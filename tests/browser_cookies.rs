#![cfg(any(target_os = "macos", target_os = "linux"))]

use cookieheap::browser::BrowserCookieExtractor;
use cookieheap::config::{Browser, BrowserCookieConfig};
use cookieheap::error::HeapError;
use cookieheap::platform::CookieSource;
use rusqlite::Connection;
use std::path::Path;
use tempfile::tempdir;

fn create_chrome_cookie_db(path: &Path) {
    let conn = Connection::open(path).expect("open chrome db");
    conn.execute("CREATE TABLE meta (key TEXT, value TEXT)", [])
        .expect("create meta");
    conn.execute("INSERT INTO meta (key, value) VALUES ('version', '24')", [])
        .expect("insert meta");
    conn.execute(
        "CREATE TABLE cookies (
            host_key TEXT,
            name TEXT,
            value TEXT,
            encrypted_value BLOB,
            path TEXT,
            expires_utc INTEGER,
            is_secure INTEGER,
            is_httponly INTEGER
        )",
        [],
    )
    .expect("create cookies");
    for (host, name, value) in [
        (".example.com", "sid", "abc"),
        ("shop.example.com", "cart", "3"),
        ("example.org", "other", "x"),
    ] {
        conn.execute(
            "INSERT INTO cookies (
                host_key, name, value, encrypted_value, path, expires_utc, is_secure, is_httponly
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (host, name, value, Vec::<u8>::new(), "/", 0i64, 1i64, 1i64),
        )
        .expect("insert cookie");
    }
}

fn create_firefox_cookie_db(path: &Path) {
    let conn = Connection::open(path).expect("open firefox db");
    conn.execute_batch("PRAGMA user_version = 16;")
        .expect("set schema version");
    conn.execute(
        "CREATE TABLE moz_cookies (
            host TEXT,
            name TEXT,
            value TEXT,
            path TEXT,
            expiry INTEGER,
            isSecure INTEGER,
            isHttpOnly INTEGER,
            sameSite INTEGER
        )",
        [],
    )
    .expect("create moz_cookies");
    conn.execute(
        "INSERT INTO moz_cookies VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (".example.com", "theme", "dark", "/", 1_900_000_000_000i64, 0i64, 0i64, 1i64),
    )
    .expect("insert cookie");
}

fn config(browser: Browser, path: &Path) -> BrowserCookieConfig {
    BrowserCookieConfig {
        browser,
        profile: Some(path.to_string_lossy().into_owned()),
        safe_storage_password: None,
    }
}

#[tokio::test]
async fn chrome_database_answers_domain_queries() {
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("Cookies");
    create_chrome_cookie_db(&db_path);

    let snapshot = BrowserCookieExtractor::new(config(Browser::Chrome, &db_path))
        .extract_cookies()
        .await
        .expect("extract chrome cookies");
    assert_eq!(snapshot.len(), 3);

    let cookies = snapshot
        .cookies_for_domain("example.com")
        .await
        .expect("query");
    let mut names: Vec<_> = cookies.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["cart", "sid"]);

    let sid = cookies.iter().find(|c| c.name == "sid").expect("sid");
    assert_eq!(sid.value.as_deref(), Some("abc"));
    assert_eq!(sid.host_only, Some(false));
    assert_eq!(sid.session, Some(true));
    assert_eq!(sid.http_only, Some(true));
}

#[tokio::test]
async fn firefox_profile_directory_is_searched() {
    let temp = tempdir().expect("tempdir");
    let profile = temp.path().join("abcd.default-release");
    std::fs::create_dir_all(&profile).expect("mkdir");
    create_firefox_cookie_db(&profile.join("cookies.sqlite"));

    let snapshot = BrowserCookieExtractor::new(config(Browser::Firefox, temp.path()))
        .extract_cookies()
        .await
        .expect("extract firefox cookies");
    let cookie = &snapshot.cookies()[0];
    assert_eq!(cookie.name, "theme");
    assert_eq!(cookie.expiration_date, Some(1_900_000_000.0));
    assert_eq!(cookie.same_site.as_deref(), Some("lax"));
    assert_eq!(cookie.store_id.as_deref(), Some("firefox-default"));
}

#[tokio::test]
async fn missing_profile_is_reported() {
    let temp = tempdir().expect("tempdir");
    let err = BrowserCookieExtractor::new(config(Browser::Firefox, &temp.path().join("nope")))
        .extract_cookies()
        .await
        .expect_err("missing profile");
    assert!(matches!(err, HeapError::FileNotFound(_)));
}
