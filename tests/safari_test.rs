//! Safari `Cookies.binarycookies` integration tests.

use browsercookies::base::cookieerror::CookieError;
use browsercookies::cookies::safari::{self, SafariCookieStore, FLAG_HTTP_ONLY, FLAG_SECURE};
use browsercookies::cookies::{filter, CookieStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Seconds from the Unix epoch to 2001-01-01.
const MAC_EPOCH: i64 = 978_307_200;

fn cookie(flags: u32, domain: &str, name: &str, path: &str, value: &str, expiry: f64) -> Vec<u8> {
    let mut strings = Vec::new();
    let mut offsets = Vec::new();
    for s in [domain, name, path, value] {
        offsets.push((56 + strings.len()) as u32);
        strings.extend_from_slice(s.as_bytes());
        strings.push(0);
    }
    let mut out = Vec::new();
    out.extend_from_slice(&((56 + strings.len()) as u32).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for o in offsets {
        out.extend_from_slice(&o.to_le_bytes());
    }
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&expiry.to_le_bytes());
    out.extend_from_slice(&100.0f64.to_le_bytes());
    out.extend_from_slice(&strings);
    out
}

fn binary_cookies(cookies: &[Vec<u8>]) -> Vec<u8> {
    let mut page = Vec::new();
    page.extend_from_slice(&0x0000_0100u32.to_be_bytes());
    page.extend_from_slice(&(cookies.len() as u32).to_le_bytes());
    let mut offset = 8 + 4 * cookies.len() + 4;
    for c in cookies {
        page.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += c.len();
    }
    page.extend_from_slice(&[0u8; 4]);
    for c in cookies {
        page.extend_from_slice(c);
    }

    let mut file = b"cook".to_vec();
    file.extend_from_slice(&1u32.to_be_bytes());
    file.extend_from_slice(&(page.len() as u32).to_be_bytes());
    file.extend_from_slice(&page);
    file.extend_from_slice(&[0u8; 8]);
    file
}

fn write(dir: &TempDir, data: &[u8]) -> PathBuf {
    let path = dir.path().join("Cookies.binarycookies");
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_read_cookies_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        &binary_cookies(&[
            cookie(FLAG_SECURE | FLAG_HTTP_ONLY, ".apple.com", "dssid", "/", "xyz", 700_000_000.0),
            cookie(0, "example.com", "lang", "/docs", "en", 0.0),
        ]),
    );

    let cookies = safari::read_cookies(&path, &[]).unwrap();
    assert_eq!(cookies.len(), 2);

    assert_eq!(cookies[0].name, "dssid");
    assert_eq!(cookies[0].domain, ".apple.com");
    assert_eq!(cookies[0].value, "xyz");
    assert_eq!(cookies[0].expires.unix_timestamp(), MAC_EPOCH + 700_000_000);
    assert_eq!(cookies[0].creation.unix_timestamp(), MAC_EPOCH + 100);
    assert!(cookies[0].secure && cookies[0].http_only);

    assert_eq!(cookies[1].path, "/docs");
    assert!(!cookies[1].secure && !cookies[1].http_only);
}

#[test]
fn test_filters_and_repeat_reads() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        &binary_cookies(&[
            cookie(FLAG_SECURE, "example.com", "a", "/", "1", 0.0),
            cookie(0, "example.com", "b", "/", "2", 0.0),
        ]),
    );

    let mut store = SafariCookieStore::new(&path);
    let first = store.read_cookies(&[&filter::secure]).unwrap();
    let second = store.read_cookies(&[&filter::secure]).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert!(store.is_default_profile());
}

#[test]
fn test_not_binary_cookies() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, b"SQLite format 3\0");
    assert!(matches!(
        safari::read_cookies(&path, &[]),
        Err(CookieError::InvalidData { .. })
    ));
}

#[test]
fn test_truncated_file() {
    let dir = TempDir::new().unwrap();
    let mut data = binary_cookies(&[cookie(0, "example.com", "a", "/", "1", 0.0)]);
    data.truncate(20);
    let path = write(&dir, &data);
    assert!(safari::read_cookies(&path, &[]).is_err());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        safari::read_cookies(dir.path().join("Cookies.binarycookies"), &[]),
        Err(CookieError::StoreNotFound { .. })
    ));
}
