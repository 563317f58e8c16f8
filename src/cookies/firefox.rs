//! Firefox cookie store (`cookies.sqlite`, table `moz_cookies`).
//!
//! Known column counts across releases: 13, 14 (78 ESR) and 15 (82+).
//! Stores older than 78 ESR still carry a `baseDomain` column holding the
//! registrable domain; newer ones only keep `host`, so the domain is
//! derived through the Public Suffix List instead.
//!
//! ```text
//! -- Firefox 78 ESR
//! CREATE TABLE moz_cookies(
//!     id INTEGER PRIMARY KEY,
//!     originAttributes TEXT NOT NULL DEFAULT '',
//!     name TEXT,
//!     value TEXT,
//!     host TEXT,
//!     path TEXT,
//!     expiry INTEGER,
//!     lastAccessed INTEGER,
//!     creationTime INTEGER,
//!     isSecure INTEGER,
//!     isHttpOnly INTEGER,
//!     inBrowserElement INTEGER DEFAULT 0,
//!     sameSite INTEGER DEFAULT 0,
//!     rawSameSite INTEGER DEFAULT 0,
//!     CONSTRAINT moz_uniqueid UNIQUE (name, host, path, originAttributes)
//! )
//! ```

use crate::base::cookieerror::CookieError;
use crate::cookies::container::MemoryContainer;
use crate::cookies::cookie::Cookie;
use crate::cookies::decode::{flag, text, unexpected, unix_time};
use crate::cookies::filter::Filter;
use crate::cookies::psl::base_domain;
use crate::cookies::schema::{resolve, ColumnMap, SchemaLayout};
use crate::cookies::store::{read_store, ContainerSource, CookieStore, DatabaseHandle, StoreInfo};
use crate::cookies::value::{RawValue, Record};
use crate::cookies::walker::{walk_table, DecodeMode, Walker};
use std::path::PathBuf;

pub const BROWSER: &str = "firefox";

pub const COOKIES_TABLE: &str = "moz_cookies";

const LAYOUT: SchemaLayout = SchemaLayout {
    table: COOKIES_TABLE,
    fallbacks: &[
        ("baseDomain", 1), // pre 78 ESR
        ("name", 2),
        ("value", 3),
        ("host", 4),
        ("path", 5),
        ("expiry", 6),
        ("creationTime", 8),
        ("isSecure", 9),
        ("isHttpOnly", 10),
    ],
    base_domain_column: Some("baseDomain"),
};

/// Read all cookies accepted by `filters` from a Firefox `cookies.sqlite`.
pub fn read_cookies(
    path: impl Into<PathBuf>,
    filters: &[&dyn Filter],
) -> Result<Vec<Cookie>, CookieError> {
    let mut store = FirefoxCookieStore::new(path);
    read_store(Some(&mut store), filters)
}

pub struct FirefoxCookieStore {
    info: StoreInfo,
    handle: DatabaseHandle,
    mode: DecodeMode,
}

impl FirefoxCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_info(StoreInfo::new(BROWSER, path))
    }

    pub fn from_info(info: StoreInfo) -> Self {
        let handle = DatabaseHandle::new(ContainerSource::File(info.file_name.clone()));
        Self {
            info,
            handle,
            mode: DecodeMode::default(),
        }
    }

    /// A store backed by records already in memory.
    pub fn from_container(info: StoreInfo, container: MemoryContainer) -> Self {
        Self {
            info,
            handle: DatabaseHandle::new(ContainerSource::Memory(container)),
            mode: DecodeMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    fn read_open(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError> {
        self.open()?;
        let database = self.handle.database()?;

        let columns = resolve(&database.tables()?, &LAYOUT);
        let mut walker = Walker::new(filters, self.mode);
        walk_table(database, COOKIES_TABLE, &mut walker, |record| {
            decode_record(&columns, record)
        })?;
        Ok(walker.finish(&self.info.browser))
    }
}

impl CookieStore for FirefoxCookieStore {
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

/// Decode one `moz_cookies` record.
pub(crate) fn decode_record(columns: &ColumnMap, record: &Record) -> Result<Cookie, CookieError> {
    columns.check_bounds(record)?;

    let name = text(columns.get(record, "name")?, "Name")?;
    let value = text(columns.get(record, "value")?, "Value")?;

    let domain = if columns.base_domain_removed() {
        base_domain(&text(columns.get(record, "host")?, "Host")?)
    } else {
        text(columns.get(record, "baseDomain")?, "Domain")?
    };

    let path = text(columns.get(record, "path")?, "Path")?;

    let expiry = columns.get(record, "expiry")?;
    let expires = unix_time(expiry_seconds(expiry)?, "Expires", expiry)?;

    let creation_time = columns.get(record, "creationTime")?;
    let creation = match creation_time {
        // microseconds, sub-second part dropped
        RawValue::Int64(micros) => unix_time(micros / 1_000_000, "Creation", creation_time)?,
        other => return Err(unexpected("Creation", other)),
    };

    let secure = flag(columns.get(record, "isSecure")?, "Secure")?;
    let http_only = flag(columns.get(record, "isHttpOnly")?, "HttpOnly")?;

    Ok(Cookie {
        name,
        value,
        domain,
        path,
        expires,
        creation,
        secure,
        http_only,
    })
}

/// `expiry` has been written both as a 32-bit signed and as a 64-bit
/// unsigned integer; SQLite readers report it as a 64-bit signed integer.
fn expiry_seconds(expiry: &RawValue) -> Result<i64, CookieError> {
    match expiry {
        RawValue::Int32(secs) => Ok(i64::from(*secs)),
        RawValue::UInt64(secs) => i64::try_from(*secs).map_err(|_| unexpected("Expires", expiry)),
        RawValue::Int64(secs) => Ok(*secs),
        other => Err(unexpected("Expires", other)),
    }
}
