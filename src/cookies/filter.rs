//! Cookie filter predicates.
//!
//! A filter is anything that can accept or reject a decoded [`Cookie`]; any
//! `Fn(&Cookie) -> bool` qualifies. Readers keep a cookie only if every
//! filter accepts it, and keep everything when no filters are given.
//!
//! ```
//! use browsercookies::cookies::filter::{self, Filter};
//!
//! let filters: [&dyn Filter; 2] = [&filter::domain("example.com"), &filter::name("session")];
//! # let _ = filters;
//! ```

use crate::cookies::cookie::Cookie;
use time::OffsetDateTime;

pub trait Filter {
    fn filter(&self, cookie: &Cookie) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Cookie) -> bool,
{
    fn filter(&self, cookie: &Cookie) -> bool {
        self(cookie)
    }
}

/// True iff every filter accepts `cookie`.
pub fn filter_cookie(cookie: &Cookie, filters: &[&dyn Filter]) -> bool {
    filters.iter().all(|f| f.filter(cookie))
}

pub fn domain(domain: impl Into<String>) -> impl Filter {
    let domain = domain.into();
    move |c: &Cookie| c.domain == domain
}

pub fn domain_has_suffix(suffix: impl Into<String>) -> impl Filter {
    let suffix = suffix.into();
    move |c: &Cookie| c.domain.ends_with(&suffix)
}

pub fn name(name: impl Into<String>) -> impl Filter {
    let name = name.into();
    move |c: &Cookie| c.name == name
}

pub fn name_has_prefix(prefix: impl Into<String>) -> impl Filter {
    let prefix = prefix.into();
    move |c: &Cookie| c.name.starts_with(&prefix)
}

pub fn path(path: impl Into<String>) -> impl Filter {
    let path = path.into();
    move |c: &Cookie| c.path == path
}

pub fn secure(c: &Cookie) -> bool {
    c.secure
}

pub fn http_only(c: &Cookie) -> bool {
    c.http_only
}

/// Persistent cookies whose expiry has passed. Session cookies never match.
pub fn expired(c: &Cookie) -> bool {
    c.is_expired(OffsetDateTime::now_utc())
}

/// Cookies a browser would still send: named and not expired.
pub fn valid(c: &Cookie) -> bool {
    !c.name.is_empty() && !expired(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, domain: &str, secure: bool) -> Cookie {
        Cookie {
            secure,
            ..Cookie::new(
                name,
                "v",
                domain,
                "/",
                OffsetDateTime::UNIX_EPOCH,
                OffsetDateTime::UNIX_EPOCH,
            )
        }
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        assert!(filter_cookie(&cookie("a", "example.com", false), &[]));
    }

    #[test]
    fn test_all_filters_must_accept() {
        let by_domain = domain("example.com");
        let by_name = name("session");
        let filters: [&dyn Filter; 2] = [&by_domain, &by_name];

        assert!(filter_cookie(&cookie("session", "example.com", false), &filters));
        assert!(!filter_cookie(&cookie("session", "other.com", false), &filters));
        assert!(!filter_cookie(&cookie("id", "example.com", false), &filters));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let c = cookie("__Host-id", "login.example.com", true);
        assert!(name_has_prefix("__Host-").filter(&c));
        assert!(domain_has_suffix("example.com").filter(&c));
        assert!(!domain_has_suffix("example.org").filter(&c));
        assert!(path("/").filter(&c));
    }

    #[test]
    fn test_flag_filters() {
        let c = cookie("a", "example.com", true);
        assert!(secure.filter(&c));
        assert!(!http_only.filter(&c));
    }

    #[test]
    fn test_expiry_filters() {
        let session = cookie("a", "example.com", false);
        assert!(!expired(&session));
        assert!(valid(&session));

        let stale = Cookie {
            expires: OffsetDateTime::from_unix_timestamp(1_000_000).unwrap(),
            ..session.clone()
        };
        assert!(expired(&stale));
        assert!(!valid(&stale));

        let unnamed = cookie("", "example.com", false);
        assert!(!valid(&unnamed));
    }

    #[test]
    fn test_closure_filter() {
        let long_value = |c: &Cookie| c.value.len() > 3;
        assert!(!long_value.filter(&cookie("a", "example.com", false)));
    }
}
