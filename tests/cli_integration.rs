use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const COOKIES: &str = r#"{"cookies": [
    {"name": "sid", "domain": ".example.com", "value": "1", "httpOnly": true, "storeId": "0"},
    {"name": "other", "domain": "example.org", "value": "2"}
]}"#;

#[test]
fn test_cli_help_succeeds() {
    let output = cargo_bin_cmd!("cookieheap")
        .arg("--help")
        .output()
        .expect("run cookieheap");
    assert!(output.status.success(), "help should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "help should include usage text");
}

#[test]
fn test_cli_prints_collected_cookies() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    fs::write(&path, COOKIES).expect("write cookies");

    let output = cargo_bin_cmd!("cookieheap")
        .arg("--cookies-file")
        .arg(&path)
        .arg("--print")
        .arg("https://www.example.com/")
        .env_remove("COOKIEHEAP_BROWSER")
        .env_remove("COOKIEHEAP_KEY_CASE")
        .output()
        .expect("run cookieheap");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let exported: Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    let cookies = exported.as_array().expect("array");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0]["name"], "sid");
    assert_eq!(cookies[0]["httpOnly"], true);
    assert_eq!(cookies[0]["url"], "https://www.example.com");
    assert!(cookies[0].get("storeId").is_none());
}

#[test]
fn test_cli_writes_snake_case_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    let out = temp.path().join("export.json");
    fs::write(&path, COOKIES).expect("write cookies");

    let output = cargo_bin_cmd!("cookieheap")
        .arg("--cookies-file")
        .arg(&path)
        .arg("--key-case")
        .arg("snake")
        .arg("--output")
        .arg(&out)
        .arg("example.com")
        .arg("example.org")
        .env_remove("COOKIEHEAP_BROWSER")
        .output()
        .expect("run cookieheap");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let exported = fs::read_to_string(&out).expect("read export");
    assert!(exported.contains("\"http_only\": true"));
    let cookies: Value = serde_json::from_str(&exported).expect("json");
    assert_eq!(cookies.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_cli_reports_nothing_collected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    fs::write(&path, COOKIES).expect("write cookies");

    let output = cargo_bin_cmd!("cookieheap")
        .arg("--cookies-file")
        .arg(&path)
        .arg("--print")
        .arg("https://unrelated.test/")
        .env_remove("COOKIEHEAP_BROWSER")
        .output()
        .expect("run cookieheap");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No cookies collected yet"));
}

#[test]
fn test_cli_missing_cookie_file_exit_code() {
    let temp = tempdir().expect("tempdir");
    let output = cargo_bin_cmd!("cookieheap")
        .arg("--cookies-file")
        .arg(temp.path().join("missing.json"))
        .arg("example.com")
        .env_remove("COOKIEHEAP_BROWSER")
        .output()
        .expect("run cookieheap");
    assert_eq!(output.status.code(), Some(37));
}

#[test]
fn test_cli_cookies_file_overrides_browser_env() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    fs::write(&path, COOKIES).expect("write cookies");

    let output = cargo_bin_cmd!("cookieheap")
        .arg("--cookies-file")
        .arg(&path)
        .arg("--print")
        .arg("example.org")
        .env("COOKIEHEAP_BROWSER", "firefox")
        .env_remove("COOKIEHEAP_KEY_CASE")
        .output()
        .expect("run cookieheap");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let exported: Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(exported[0]["name"], "other");
    assert_eq!(exported[0]["url"], "https://example.org");
}

#[test]
fn test_cli_verbose_flag_enables_debug_logging() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    fs::write(&path, COOKIES).expect("write cookies");

    let run = |verbose: bool| {
        let mut cmd = cargo_bin_cmd!("cookieheap");
        cmd.arg("--cookies-file")
            .arg(&path)
            .arg("--print")
            .arg("www.example.com")
            .env_remove("RUST_LOG")
            .env_remove("COOKIEHEAP_BROWSER")
            .env_remove("COOKIEHEAP_KEY_CASE");
        if verbose {
            cmd.arg("-vv");
        }
        let output = cmd.output().expect("run cookieheap");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stderr).into_owned()
    };

    assert!(run(true).contains("domain variants"));
    assert!(!run(false).contains("domain variants"));
}
