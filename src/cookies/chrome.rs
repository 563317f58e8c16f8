//! Chromium-family cookie store (`Cookies`, table `cookies`).
//!
//! Shared by Chrome, Chromium, Edge, Brave and Opera. Times are stored as
//! microseconds since 1601-01-01 00:00:00 UTC (Windows FILETIME epoch).
//!
//! ## Encrypted values
//! Current releases leave `value` empty and store the cookie in
//! `encrypted_value` (`v10`/`v11` prefixed). Recovering those needs the OS
//! keyring, which lives outside this crate: supply a [`ValueDecryptor`] with
//! [`ChromeCookieStore::with_decryptor`], otherwise such records fail to
//! decode with `CookieError::EncryptedValue`.
//!
//! Reference: `net/extras/sqlite/sqlite_persistent_cookie_store.cc`

use crate::base::cookieerror::CookieError;
use crate::cookies::container::MemoryContainer;
use crate::cookies::cookie::Cookie;
use crate::cookies::decode::{flag, text, unexpected, unix_time};
use crate::cookies::filter::Filter;
use crate::cookies::schema::{resolve, ColumnMap, SchemaLayout};
use crate::cookies::store::{read_store, ContainerSource, CookieStore, DatabaseHandle, StoreInfo};
use crate::cookies::value::{RawValue, Record};
use crate::cookies::walker::{walk_table, DecodeMode, Walker};
use std::path::PathBuf;
use time::OffsetDateTime;

/// Offset between the Chromium epoch (1601) and the Unix epoch, in microseconds.
///
/// Reference: `base/time/time.h`
pub const CHROME_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

pub const COOKIES_TABLE: &str = "cookies";

/// Column positions of the current (version 24) schema.
const LAYOUT: SchemaLayout = SchemaLayout {
    table: COOKIES_TABLE,
    fallbacks: &[
        ("creation_utc", 0),
        ("host_key", 1),
        ("name", 3),
        ("value", 4),
        ("encrypted_value", 5),
        ("path", 6),
        ("expires_utc", 7),
        ("is_secure", 8),
        ("is_httponly", 9),
    ],
    base_domain_column: None,
};

/// Browser tag for the default Chromium-family build on this platform.
pub fn default_browser() -> &'static str {
    if cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux")) {
        "chrome"
    } else {
        "chromium"
    }
}

/// Decrypts `encrypted_value` payloads.
///
/// `host` is the cookie's `host_key`; newer databases bind the plaintext to it.
pub trait ValueDecryptor {
    fn decrypt(&self, host: &str, encrypted: &[u8]) -> Result<String, CookieError>;
}

impl<F> ValueDecryptor for F
where
    F: Fn(&str, &[u8]) -> Result<String, CookieError>,
{
    fn decrypt(&self, host: &str, encrypted: &[u8]) -> Result<String, CookieError> {
        self(host, encrypted)
    }
}

/// Read all cookies accepted by `filters` from a Chromium `Cookies` database.
pub fn read_cookies(
    path: impl Into<PathBuf>,
    filters: &[&dyn Filter],
) -> Result<Vec<Cookie>, CookieError> {
    let mut store = ChromeCookieStore::new(path);
    read_store(Some(&mut store), filters)
}

pub struct ChromeCookieStore {
    info: StoreInfo,
    handle: DatabaseHandle,
    mode: DecodeMode,
    decryptor: Option<Box<dyn ValueDecryptor>>,
}

impl ChromeCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_info(StoreInfo::new(default_browser(), path))
    }

    pub fn from_info(info: StoreInfo) -> Self {
        let handle = DatabaseHandle::new(ContainerSource::File(info.file_name.clone()));
        Self {
            info,
            handle,
            mode: DecodeMode::default(),
            decryptor: None,
        }
    }

    pub fn from_container(info: StoreInfo, container: MemoryContainer) -> Self {
        Self {
            info,
            handle: DatabaseHandle::new(ContainerSource::Memory(container)),
            mode: DecodeMode::default(),
            decryptor: None,
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_decryptor(mut self, decryptor: impl ValueDecryptor + 'static) -> Self {
        self.decryptor = Some(Box::new(decryptor));
        self
    }

    fn read_open(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError> {
        self.open()?;
        let database = self.handle.database()?;

        let columns = resolve(&database.tables()?, &LAYOUT);
        let decryptor = self.decryptor.as_deref();
        let mut walker = Walker::new(filters, self.mode);
        walk_table(database, COOKIES_TABLE, &mut walker, |record| {
            decode_record(&columns, record, decryptor)
        })?;
        Ok(walker.finish(&self.info.browser))
    }
}

impl CookieStore for ChromeCookieStore {
    fn info(&self) -> &StoreInfo {
        &self.info
    }

    fn open(&mut self) -> Result<(), CookieError> {
        self.handle.open()
    }

    fn read_cookies(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError> {
        let result = self.read_open(filters);
        self.close();
        result
    }

    fn close(&mut self) {
        self.handle.close();
    }
}

/// Decode one `cookies` record.
pub(crate) fn decode_record(
    columns: &ColumnMap,
    record: &Record,
    decryptor: Option<&dyn ValueDecryptor>,
) -> Result<Cookie, CookieError> {
    columns.check_bounds(record)?;

    let name = text(columns.get(record, "name")?, "Name")?;
    let host = text(columns.get(record, "host_key")?, "Domain")?;

    let mut value = text(columns.get(record, "value")?, "Value")?;
    if value.is_empty() && columns.contains("encrypted_value") {
        match columns.get(record, "encrypted_value")? {
            RawValue::Blob(encrypted) if !encrypted.is_empty() => {
                let decryptor = decryptor.ok_or_else(|| CookieError::EncryptedValue {
                    name: name.clone(),
                    host: host.clone(),
                })?;
                value = decryptor.decrypt(&host, encrypted)?;
            }
            RawValue::Blob(_) | RawValue::Null => {}
            other => return Err(unexpected("Value", other)),
        }
    }

    let path = text(columns.get(record, "path")?, "Path")?;

    let expires_utc = columns.get(record, "expires_utc")?;
    let expires = match expires_utc.as_integer() {
        Some(micros) => chrome_time(micros, "Expires", expires_utc)?,
        None => return Err(unexpected("Expires", expires_utc)),
    };

    let creation_utc = columns.get(record, "creation_utc")?;
    let creation = match creation_utc {
        RawValue::Int64(micros) => chrome_time(i128::from(*micros), "Creation", creation_utc)?,
        other => return Err(unexpected("Creation", other)),
    };

    let secure = flag(columns.get(record, "is_secure")?, "Secure")?;
    let http_only = flag(columns.get(record, "is_httponly")?, "HttpOnly")?;

    Ok(Cookie {
        name,
        value,
        domain: host,
        path,
        expires,
        creation,
        secure,
        http_only,
    })
}

/// Convert Chromium epoch microseconds to whole Unix seconds.
///
/// Zero marks a session cookie and maps to the Unix epoch.
fn chrome_time(
    micros: i128,
    field: &'static str,
    raw: &RawValue,
) -> Result<OffsetDateTime, CookieError> {
    if micros == 0 {
        return Ok(OffsetDateTime::UNIX_EPOCH);
    }
    let unix_secs = (micros - i128::from(CHROME_EPOCH_OFFSET_MICROS)) / 1_000_000;
    let unix_secs = i64::try_from(unix_secs).map_err(|_| unexpected(field, raw))?;
    unix_time(unix_secs, field, raw)
}
