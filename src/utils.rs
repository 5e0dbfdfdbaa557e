//! Utility functions and helpers

use crate::error::{HeapError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// URL validation and parsing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate and normalize a page URL
    pub fn validate_url(input: &str) -> Result<Url> {
        let input = input.trim();
        // Pages are assumed to be served over https when no scheme is given
        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&url_str)
            .map_err(|e| HeapError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(HeapError::InvalidUrl(format!(
                "URL '{}' has no host",
                input
            )));
        }
        Ok(url)
    }

    /// Origin string recorded on collected cookies, e.g. `https://example.com`
    pub fn origin(url: &Url) -> String {
        url.origin().ascii_serialization()
    }

    /// Host part used to derive domain variants
    pub fn host(url: &Url) -> Result<String> {
        url.host_str()
            .map(|host| host.to_string())
            .ok_or_else(|| HeapError::InvalidUrl(format!("URL '{}' has no host", url)))
    }
}

/// File system utilities
pub struct FileUtils;

impl FileUtils {
    /// Expand tilde (~) in file paths
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(rest) = path.strip_prefix('~') {
            let home_dir = dirs::home_dir()
                .ok_or_else(|| HeapError::Config("Cannot determine home directory".to_string()))?;
            let rest = rest.trim_start_matches(['/', '\\']);
            if rest.is_empty() {
                Ok(home_dir)
            } else {
                Ok(home_dir.join(rest))
            }
        } else {
            Ok(PathBuf::from(path))
        }
    }

    /// Check if file exists and is readable
    pub fn check_file_readable(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(HeapError::FileNotFound(format!(
                "File not found: {:?}",
                path
            )));
        }

        if !path.is_file() {
            return Err(HeapError::Config(format!("Path is not a file: {:?}", path)));
        }

        std::fs::File::open(path).map_err(|e| {
            HeapError::BrowserCookie(format!("Permission denied reading {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Whether a profile argument names a path rather than a profile
    pub fn is_path_like(value: &str) -> bool {
        value.contains('/') || value.contains('\\') || value.starts_with('~')
    }

    /// Recursively collect files named `filename` under `root`
    pub fn find_files(root: &Path, filename: &str) -> Vec<PathBuf> {
        let mut matches = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("Skipping unreadable directory {:?}: {}", dir, e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.file_name().and_then(|name| name.to_str()) == Some(filename) {
                    matches.push(path);
                }
            }
        }
        matches
    }

    /// Most recently modified of `paths`
    pub fn newest_path(paths: Vec<PathBuf>) -> Option<PathBuf> {
        paths
            .into_iter()
            .filter_map(|path| {
                let modified = std::fs::metadata(&path).ok()?.modified().ok()?;
                Some((modified, path))
            })
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path)
    }
}
