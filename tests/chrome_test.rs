//! Chromium `Cookies` database integration tests.

use browsercookies::base::cookieerror::CookieError;
use browsercookies::cookies::chrome::{self, ChromeCookieStore, CHROME_EPOCH_OFFSET_MICROS};
use browsercookies::cookies::{filter, CookieStore, DecodeMode};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

const SCHEMA: &str = "CREATE TABLE cookies(
    creation_utc INTEGER NOT NULL,
    host_key TEXT NOT NULL,
    top_frame_site_key TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    encrypted_value BLOB NOT NULL,
    path TEXT NOT NULL,
    expires_utc INTEGER NOT NULL,
    is_secure INTEGER NOT NULL,
    is_httponly INTEGER NOT NULL,
    last_access_utc INTEGER NOT NULL,
    has_expires INTEGER NOT NULL,
    is_persistent INTEGER NOT NULL,
    priority INTEGER NOT NULL,
    samesite INTEGER NOT NULL,
    source_scheme INTEGER NOT NULL,
    source_port INTEGER NOT NULL,
    last_update_utc INTEGER NOT NULL,
    UNIQUE (host_key, top_frame_site_key, name, path, source_scheme, source_port)
)";

fn chrome_micros(unix_secs: i64) -> i64 {
    unix_secs * 1_000_000 + CHROME_EPOCH_OFFSET_MICROS
}

struct Row<'a> {
    host: &'a str,
    name: &'a str,
    value: &'a str,
    encrypted: &'a [u8],
    expires: i64,
    secure: i64,
    http_only: i64,
}

fn db(dir: &TempDir, rows: &[Row<'_>]) -> PathBuf {
    let path = dir.path().join("Cookies");
    let conn = Connection::open(&path).unwrap();
    conn.execute(SCHEMA, []).unwrap();
    for row in rows {
        conn.execute(
            "INSERT INTO cookies VALUES (?1, ?2, '', ?3, ?4, ?5, '/', ?6, ?7, ?8, 0, 1, 1, 1, -1, 2, 443, 0)",
            params![
                chrome_micros(1_700_000_000) + 250_000,
                row.host,
                row.name,
                row.value,
                row.encrypted,
                row.expires,
                row.secure,
                row.http_only
            ],
        )
        .unwrap();
    }
    path
}

fn plain<'a>(host: &'a str, name: &'a str, value: &'a str) -> Row<'a> {
    Row {
        host,
        name,
        value,
        encrypted: b"",
        expires: chrome_micros(1_900_000_000),
        secure: 1,
        http_only: 0,
    }
}

#[test]
fn test_plaintext_cookies() {
    let dir = TempDir::new().unwrap();
    let mut session = plain("www.example.com", "sid", "1");
    session.expires = 0;
    session.http_only = 1;
    let path = db(&dir, &[plain(".example.com", "id", "abc"), session]);

    let cookies = chrome::read_cookies(&path, &[]).unwrap();
    assert_eq!(cookies.len(), 2);

    assert_eq!(cookies[0].domain, ".example.com");
    assert_eq!(cookies[0].value, "abc");
    assert_eq!(cookies[0].expires.unix_timestamp(), 1_900_000_000);
    assert_eq!(cookies[0].creation.unix_timestamp(), 1_700_000_000);
    assert!(cookies[0].secure);

    assert_eq!(cookies[1].domain, "www.example.com");
    assert!(cookies[1].is_session());
    assert!(cookies[1].http_only);
}

#[test]
fn test_encrypted_value_needs_decryptor() {
    let dir = TempDir::new().unwrap();
    let mut encrypted = plain("example.com", "token", "");
    encrypted.encrypted = b"v10\x01\x02\x03";
    let path = db(&dir, &[encrypted]);

    let err = chrome::read_cookies(&path, &[]).unwrap_err();
    assert_eq!(
        err,
        CookieError::EncryptedValue {
            name: "token".into(),
            host: "example.com".into()
        }
    );

    let mut store = ChromeCookieStore::new(&path).with_decryptor(|host: &str, data: &[u8]| {
        assert_eq!(host, "example.com");
        Ok::<_, CookieError>(format!("{}-bytes", data.len()))
    });
    let cookies = store.read_cookies(&[]).unwrap();
    assert_eq!(cookies[0].value, "6-bytes");
}

#[test]
fn test_lenient_skips_encrypted() {
    let dir = TempDir::new().unwrap();
    let mut encrypted = plain("example.com", "token", "");
    encrypted.encrypted = b"v11secret";
    let path = db(&dir, &[encrypted, plain("example.com", "id", "1")]);

    let mut store = ChromeCookieStore::new(&path).with_mode(DecodeMode::Lenient);
    let cookies = store.read_cookies(&[]).unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "id");
}

#[test]
fn test_filters() {
    let dir = TempDir::new().unwrap();
    let path = db(
        &dir,
        &[
            plain("example.com", "a", "1"),
            plain("example.org", "b", "2"),
        ],
    );
    let cookies = chrome::read_cookies(&path, &[&filter::domain("example.org")]).unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "b");
}

#[test]
fn test_store_info() {
    let store = ChromeCookieStore::new("/tmp/Default/Cookies");
    assert_eq!(store.browser(), chrome::default_browser());
    assert_eq!(store.file_name(), std::path::Path::new("/tmp/Default/Cookies"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        chrome::read_cookies(dir.path().join("Cookies"), &[]),
        Err(CookieError::StoreNotFound { .. })
    ));
}
