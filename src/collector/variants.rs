//! Domain variants used as cookie store filters for a page host.

use std::collections::HashSet;
use std::net::IpAddr;

/// Every domain filter worth querying for `hostname`.
///
/// For `k` dot-separated labels this is each suffix `labels[i..]` with
/// `i in 0..k-1`, bare and dot-prefixed, which always covers the last two
/// labels. The lone top-level label is never queried. Order is
/// deterministic: longest suffix first, bare before dotted.
///
/// Single-label hosts (`localhost`) yield the host itself bare and dotted.
/// IP literals have no parent domains and yield only themselves.
pub fn derive_domain_variants(hostname: &str) -> Vec<String> {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return Vec::new();
    }
    if host.starts_with('[') || host.parse::<IpAddr>().is_ok() {
        return vec![host];
    }

    let labels: Vec<&str> = host.split('.').filter(|label| !label.is_empty()).collect();
    let mut variants = Variants::default();

    if labels.len() == 1 {
        variants.push_both(labels[0]);
        return variants.into_vec();
    }

    for start in 0..labels.len() - 1 {
        variants.push_both(&labels[start..].join("."));
    }
    variants.push_both(&labels[labels.len() - 2..].join("."));
    variants.into_vec()
}

#[derive(Default)]
struct Variants {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl Variants {
    fn push_both(&mut self, suffix: &str) {
        self.push(suffix.to_string());
        self.push(format!(".{}", suffix));
    }

    fn push(&mut self, candidate: String) {
        if self.seen.insert(candidate.clone()) {
            self.ordered.push(candidate);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::derive_domain_variants;
    use std::collections::HashSet;

    #[test]
    fn nested_host_yields_every_suffix_bare_and_dotted() {
        let variants = derive_domain_variants("a.b.example.com");
        assert_eq!(
            variants,
            vec![
                "a.b.example.com",
                ".a.b.example.com",
                "b.example.com",
                ".b.example.com",
                "example.com",
                ".example.com",
            ]
        );
    }

    #[test]
    fn two_label_host_yields_bare_and_dotted() {
        assert_eq!(
            derive_domain_variants("example.com"),
            vec!["example.com", ".example.com"]
        );
    }

    #[test]
    fn variants_never_repeat_and_skip_the_tld() {
        for host in ["x.y.z.example.co.uk", "www.example.org", "a.b"] {
            let variants = derive_domain_variants(host);
            let unique: HashSet<_> = variants.iter().collect();
            assert_eq!(unique.len(), variants.len(), "{host}");
            let labels = host.split('.').count();
            assert_eq!(variants.len(), 2 * (labels - 1), "{host}");
            let tld = host.rsplit('.').next().expect("tld");
            assert!(!variants.iter().any(|v| v.trim_start_matches('.') == tld));
        }
    }

    #[test]
    fn single_label_and_ip_hosts() {
        assert_eq!(
            derive_domain_variants("localhost"),
            vec!["localhost", ".localhost"]
        );
        assert_eq!(derive_domain_variants("127.0.0.1"), vec!["127.0.0.1"]);
        assert_eq!(derive_domain_variants("[::1]"), vec!["[::1]"]);
        assert!(derive_domain_variants("").is_empty());
    }

    #[test]
    fn trailing_dot_and_case_are_normalized() {
        assert_eq!(
            derive_domain_variants("Shop.Example.COM."),
            vec![
                "shop.example.com",
                ".shop.example.com",
                "example.com",
                ".example.com",
            ]
        );
    }
}
