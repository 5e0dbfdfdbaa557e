//! Configuration management for cookieheap

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{HeapError, Result};

/// Browser types supported for cookie extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Chromium,
    Edge,
    Brave,
    Opera,
    Vivaldi,
    Whale,
    Firefox,
}

impl FromStr for Browser {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "chromium" => Ok(Browser::Chromium),
            "edge" => Ok(Browser::Edge),
            "brave" => Ok(Browser::Brave),
            "opera" => Ok(Browser::Opera),
            "vivaldi" => Ok(Browser::Vivaldi),
            "whale" => Ok(Browser::Whale),
            "firefox" => Ok(Browser::Firefox),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Chrome => "chrome",
            Browser::Chromium => "chromium",
            Browser::Edge => "edge",
            Browser::Brave => "brave",
            Browser::Opera => "opera",
            Browser::Vivaldi => "vivaldi",
            Browser::Whale => "whale",
            Browser::Firefox => "firefox",
        };
        write!(f, "{}", name)
    }
}

/// Browser cookie configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookieConfig {
    pub browser: Browser,
    pub profile: Option<String>,
    /// Password Chromium browsers use to encrypt cookie values
    /// ("Safe Storage" entry of the OS keyring).
    pub safe_storage_password: Option<String>,
}

impl BrowserCookieConfig {
    /// Parse from `BROWSER[:PROFILE]`
    pub fn parse(input: &str) -> Result<Self> {
        let (browser_str, profile) = match input.split_once(':') {
            Some((browser, profile)) if !profile.is_empty() => {
                (browser, Some(profile.to_string()))
            }
            Some((browser, _)) => (browser, None),
            None => (input, None),
        };

        let browser = browser_str
            .parse::<Browser>()
            .map_err(|_| HeapError::Config(format!("Unsupported browser: {}", browser_str)))?;

        Ok(BrowserCookieConfig {
            browser,
            profile,
            safe_storage_password: None,
        })
    }
}

/// Where cookies are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSourceConfig {
    Browser(BrowserCookieConfig),
    /// JSON array of browser cookie objects
    File(PathBuf),
}

/// Naming convention applied to JSON keys on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    #[default]
    AsIs,
    Snake,
    Camel,
    Kebab,
    Pascal,
}

impl FromStr for KeyCase {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "as_is" | "none" | "preserve" => Ok(KeyCase::AsIs),
            "snake" | "snake_case" => Ok(KeyCase::Snake),
            "camel" | "camelcase" | "camel_case" => Ok(KeyCase::Camel),
            "kebab" | "kebab_case" => Ok(KeyCase::Kebab),
            "pascal" | "pascalcase" | "pascal_case" => Ok(KeyCase::Pascal),
            _ => Err(()),
        }
    }
}

impl fmt::Display for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyCase::AsIs => "as-is",
            KeyCase::Snake => "snake",
            KeyCase::Camel => "camel",
            KeyCase::Kebab => "kebab",
            KeyCase::Pascal => "pascal",
        };
        write!(f, "{}", name)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Write the export here instead of the clipboard
    pub file: Option<PathBuf>,
    /// Write the export to stdout instead of the clipboard
    pub print: bool,
    pub silent: bool,
}

impl OutputConfig {
    pub fn uses_clipboard(&self) -> bool {
        self.file.is_none() && !self.print
    }
}

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub urls: Vec<String>,
    pub source: CookieSourceConfig,
    pub key_case: KeyCase,
    pub output: OutputConfig,
    pub interactive: bool,
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            urls: Vec::new(),
            source: CookieSourceConfig::Browser(BrowserCookieConfig {
                browser: Browser::Chrome,
                profile: None,
                safe_storage_password: None,
            }),
            key_case: KeyCase::AsIs,
            output: OutputConfig::default(),
            interactive: false,
            verbosity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Browser, BrowserCookieConfig, Config, KeyCase};
    use crate::error::HeapError;

    #[test]
    fn browser_config_parses_profile() {
        let config = BrowserCookieConfig::parse("firefox:default-release").expect("parse");
        assert_eq!(config.browser, Browser::Firefox);
        assert_eq!(config.profile.as_deref(), Some("default-release"));

        let config = BrowserCookieConfig::parse("Chrome").expect("parse");
        assert_eq!(config.browser, Browser::Chrome);
        assert_eq!(config.profile, None);
    }

    #[test]
    fn browser_config_keeps_colons_in_windows_paths() {
        let config =
            BrowserCookieConfig::parse("edge:C:\\Users\\me\\Edge\\Cookies").expect("parse");
        assert_eq!(config.browser, Browser::Edge);
        assert_eq!(config.profile.as_deref(), Some("C:\\Users\\me\\Edge\\Cookies"));
    }

    #[test]
    fn browser_config_rejects_unknown_browser() {
        let err = BrowserCookieConfig::parse("netscape").expect_err("unsupported");
        assert!(matches!(err, HeapError::Config(_)));
    }

    #[test]
    fn key_case_parses_aliases() {
        assert_eq!("snake".parse::<KeyCase>(), Ok(KeyCase::Snake));
        assert_eq!("snake-case".parse::<KeyCase>(), Ok(KeyCase::Snake));
        assert_eq!("CamelCase".parse::<KeyCase>(), Ok(KeyCase::Camel));
        assert_eq!("as-is".parse::<KeyCase>(), Ok(KeyCase::AsIs));
        assert!("shouting".parse::<KeyCase>().is_err());
    }

    #[test]
    fn key_case_accepts_hyphenated_case_names() {
        assert_eq!("camel-case".parse::<KeyCase>(), Ok(KeyCase::Camel));
        assert_eq!("camel_case".parse::<KeyCase>(), Ok(KeyCase::Camel));
        assert_eq!("Pascal-Case".parse::<KeyCase>(), Ok(KeyCase::Pascal));
        assert_eq!("kebab-case".parse::<KeyCase>(), Ok(KeyCase::Kebab));
    }

    #[test]
    fn default_config_exports_to_clipboard() {
        let config = Config::default();
        assert!(config.output.uses_clipboard());
        assert_eq!(config.key_case, KeyCase::AsIs);
    }
}
