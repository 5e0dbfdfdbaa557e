//! Cookie shapes: what a cookie store hands out and what the buffer keeps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A cookie as reported by a cookie store, in the browser cookie object shape.
///
/// Only `name` and `domain` are required. Attributes the store did not report
/// stay `None` and are omitted when serialized; unknown attributes are kept
/// in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCookie {
    pub name: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoreCookie {
    /// Shorthand used by sources and tests.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Browser cookie API domain matching: `filter` (leading dot ignored)
    /// equals the cookie domain or is one of its parent domains.
    pub fn matches_domain_filter(&self, filter: &str) -> bool {
        let filter = filter.trim_start_matches('.').to_ascii_lowercase();
        if filter.is_empty() {
            return false;
        }
        let domain = self.domain.trim_start_matches('.').to_ascii_lowercase();
        domain == filter || domain.ends_with(&format!(".{}", filter))
    }
}

/// A collected cookie as stored in the buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Origin of the page the cookie was collected from.
    pub url: String,
}

impl CookieRecord {
    /// Drops the store-only attributes and tags the cookie with `origin`.
    pub fn from_store(cookie: StoreCookie, origin: impl Into<String>) -> Self {
        let StoreCookie {
            name,
            domain,
            value,
            path,
            secure,
            http_only,
            same_site,
            extra,
            store_id: _,
            host_only: _,
            expiration_date: _,
            session: _,
        } = cookie;
        Self {
            name,
            domain,
            value,
            path,
            secure,
            http_only,
            same_site,
            extra,
            url: origin.into(),
        }
    }

    /// `name + "_" + domain`; records sharing it are the same cookie.
    pub fn identity_key(&self) -> String {
        format!("{}_{}", self.name, self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::{CookieRecord, StoreCookie};
    use serde_json::json;

    #[test]
    fn store_cookie_parses_browser_shape_and_keeps_unknown_fields() {
        let cookie: StoreCookie = serde_json::from_value(json!({
            "name": "sid",
            "domain": ".example.com",
            "value": "abc",
            "path": "/",
            "hostOnly": false,
            "httpOnly": true,
            "expirationDate": 1700000000.5,
            "partitionKey": {"topLevelSite": "https://example.com"}
        }))
        .expect("parse cookie");
        assert_eq!(cookie.http_only, Some(true));
        assert_eq!(cookie.host_only, Some(false));
        assert_eq!(cookie.expiration_date, Some(1700000000.5));
        assert!(cookie.extra.contains_key("partitionKey"));
    }

    #[test]
    fn from_store_keeps_extra_attributes() {
        let mut cookie = StoreCookie::new("a", "d").with_value("v");
        cookie
            .extra
            .insert("priority".to_string(), json!("High"));
        let record = CookieRecord::from_store(cookie, "https://d");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({"name": "a", "domain": "d", "value": "v", "priority": "High", "url": "https://d"})
        );
    }

    #[test]
    fn identity_key_joins_name_and_domain() {
        let record = CookieRecord::from_store(StoreCookie::new("sid", ".example.com"), "x");
        assert_eq!(record.identity_key(), "sid_.example.com");
    }

    #[test]
    fn domain_filter_matches_parents_and_ignores_leading_dot() {
        let cookie = StoreCookie::new("a", ".shop.example.com");
        assert!(cookie.matches_domain_filter("shop.example.com"));
        assert!(cookie.matches_domain_filter(".example.com"));
        assert!(cookie.matches_domain_filter("EXAMPLE.com"));
        assert!(!cookie.matches_domain_filter("a.shop.example.com"));
        assert!(!cookie.matches_domain_filter("ample.com"));
        assert!(!cookie.matches_domain_filter("."));
    }
}
