//! Export decoded cookies for other tools.
//!
//! - [`to_netscape`]: the `cookies.txt` format read by curl and wget
//! - [`to_json`]: a JSON array of [`Cookie`] objects, times as Unix seconds

use crate::base::cookieerror::CookieError;
use crate::cookies::cookie::Cookie;

/// Render `cookies` in Netscape `cookies.txt` format.
///
/// A leading dot on the domain marks the cookie as valid for subdomains.
/// HttpOnly cookies carry curl's `#HttpOnly_` prefix and session cookies
/// an expiry of 0.
pub fn to_netscape(cookies: &[Cookie]) -> String {
    let mut lines = vec![
        "# Netscape HTTP Cookie File".to_string(),
        "# https://curl.se/docs/http-cookies.html".to_string(),
        String::new(),
    ];

    for cookie in cookies {
        // domain \t include_subdomains \t path \t secure \t expiry \t name \t value
        let include_subdomains = bool_field(cookie.domain.starts_with('.'));
        let expiry = if cookie.is_session() {
            0
        } else {
            cookie.expires.unix_timestamp()
        };
        let prefix = if cookie.http_only { "#HttpOnly_" } else { "" };

        lines.push(format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
            prefix,
            cookie.domain,
            include_subdomains,
            cookie.path,
            bool_field(cookie.secure),
            expiry,
            cookie.name,
            cookie.value
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Serialize `cookies` as a pretty-printed JSON array.
pub fn to_json(cookies: &[Cookie]) -> Result<String, CookieError> {
    Ok(serde_json::to_string_pretty(cookies)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample() -> Vec<Cookie> {
        let expires = OffsetDateTime::from_unix_timestamp(1_900_000_000).unwrap();
        let mut secure = Cookie::new("sid", "abc", ".example.com", "/", expires, expires);
        secure.secure = true;
        secure.http_only = true;
        let session = Cookie::new(
            "pref",
            "dark",
            "example.org",
            "/app",
            OffsetDateTime::UNIX_EPOCH,
            expires,
        );
        vec![secure, session]
    }

    #[test]
    fn test_to_netscape() {
        let text = to_netscape(&sample());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# Netscape HTTP Cookie File");
        assert_eq!(
            lines[3],
            "#HttpOnly_.example.com\tTRUE\t/\tTRUE\t1900000000\tsid\tabc"
        );
        assert_eq!(lines[4], "example.org\tFALSE\t/app\tFALSE\t0\tpref\tdark");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "sid");
        assert_eq!(parsed[0]["expires"], 1_900_000_000);
        assert_eq!(parsed[0]["http_only"], true);
        assert_eq!(parsed[1]["expires"], 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
        assert_eq!(to_netscape(&[]).lines().count(), 3);
    }
}
