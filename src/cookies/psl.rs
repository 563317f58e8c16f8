//! Public Suffix List (PSL) domain normalization.
//!
//! Stores that no longer persist a separate base-domain column only keep the
//! cookie's host, so the registrable domain (eTLD+1) is derived here.
//!
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use std::net::IpAddr;

/// Get the registrable domain (eTLD+1) for a domain.
/// For "sub.example.com", returns "example.com".
/// For "example.com", returns "example.com".
/// For "com" (public suffix), returns None.
pub fn registrable_domain(domain: &str) -> Option<String> {
    let domain_lower = domain.to_lowercase();
    psl::domain(domain_lower.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// Normalize a stored cookie host to the domain that owns the cookie.
///
/// Domain cookies carry a leading dot, which is dropped. IP literals and hosts
/// without a registrable domain (`localhost`, bare public suffixes) are
/// returned as-is, lowercased, since there is no shorter owner to report.
pub fn base_domain(host: &str) -> String {
    let host = host.strip_prefix('.').unwrap_or(host);
    let unbracketed = host.trim_start_matches('[').trim_end_matches(']');
    if unbracketed.parse::<IpAddr>().is_ok() {
        return unbracketed.to_lowercase();
    }
    registrable_domain(host).unwrap_or_else(|| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain() {
        assert_eq!(
            registrable_domain("example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            registrable_domain("deep.sub.example.com"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_registrable_domain_public_suffix() {
        assert_eq!(registrable_domain("com"), None);
        assert_eq!(registrable_domain("co.uk"), None);
    }

    #[test]
    fn test_base_domain_strips_leading_dot() {
        assert_eq!(base_domain(".www.example.com"), "example.com");
        assert_eq!(base_domain(".example.co.uk"), "example.co.uk");
    }

    #[test]
    fn test_base_domain_ip_literals() {
        assert_eq!(base_domain("127.0.0.1"), "127.0.0.1");
        assert_eq!(base_domain("::1"), "::1");
        assert_eq!(base_domain("[::1]"), "::1");
        assert_eq!(base_domain("[FE80::1]"), "fe80::1");
        assert_eq!(base_domain("FE80::1"), "fe80::1");
    }

    #[test]
    fn test_base_domain_without_registrable_domain() {
        assert_eq!(base_domain("localhost"), "localhost");
        assert_eq!(base_domain("co.uk"), "co.uk");
    }
}
