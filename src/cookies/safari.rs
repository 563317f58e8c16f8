//! Safari binary cookies (`Cookies.binarycookies`).
//!
//! Safari stores cookies in a proprietary binary format on macOS. The layout
//! is fixed, so there is no schema to resolve: [`BinaryCookieReader`] yields
//! one raw record at a time and [`decode_record`] turns it into a [`Cookie`]
//! under the same typed, fail-fast rules as the SQLite stores.
//!
//! ## File Format
//! 1. Header: "cook" magic, page count and page sizes (big-endian)
//! 2. Pages: `0x00000100` header, cookie count and cookie offsets (little-endian)
//! 3. Footer: checksum and trailing plist (ignored)
//!
//! Each cookie starts with a 56-byte little-endian header:
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | record size                   |
//! | 4      | 4    | version                       |
//! | 8      | 4    | flags (0x1 Secure, 0x4 HttpOnly) |
//! | 12     | 4    | has port                      |
//! | 16     | 4    | domain offset                 |
//! | 20     | 4    | name offset                   |
//! | 24     | 4    | path offset                   |
//! | 28     | 4    | value offset                  |
//! | 32     | 8    | comment offset / end marker   |
//! | 40     | 8    | expiry (f64, Mac absolute time) |
//! | 48     | 8    | creation (f64, Mac absolute time) |
//!
//! ## References
//! - https://github.com/libyal/dtformats/blob/main/documentation/Safari%20Cookies.asciidoc
//! - https://github.com/als0052/BinaryCookieReader

use crate::base::context::IoResultExt;
use crate::base::cookieerror::CookieError;
use crate::cookies::cookie::Cookie;
use crate::cookies::decode::{unexpected, unix_time};
use crate::cookies::filter::Filter;
use crate::cookies::store::{read_store, CookieStore, StoreInfo};
use crate::cookies::value::RawValue;
use crate::cookies::walker::{DecodeMode, Walker};
use std::path::PathBuf;
use time::OffsetDateTime;

pub const BROWSER: &str = "safari";

/// Magic bytes at the start of a Safari binary cookies file.
const MAGIC: &[u8; 4] = b"cook";

const PAGE_HEADER: u32 = 0x0000_0100;

const COOKIE_HEADER_LEN: usize = 56;

pub const FLAG_SECURE: u32 = 0x1;
pub const FLAG_HTTP_ONLY: u32 = 0x4;

/// Seconds between the Unix epoch and the Mac epoch (2001-01-01 00:00:00 UTC).
const MAC_TO_UNIX: i64 = 978_307_200;

/// One cookie as laid out on disk, strings still undecoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SafariRecord {
    pub flags: u32,
    pub domain: Vec<u8>,
    pub name: Vec<u8>,
    pub path: Vec<u8>,
    pub value: Vec<u8>,
    pub expiry: f64,
    pub creation: f64,
}

/// Streams [`SafariRecord`]s out of a binary cookies buffer.
///
/// Stops after the first error.
pub struct BinaryCookieReader<'a> {
    data: &'a [u8],
    pages: Vec<(usize, usize)>,
    next_page: usize,
    page: &'a [u8],
    offsets: Vec<usize>,
    next_cookie: usize,
    failed: bool,
}

impl<'a> BinaryCookieReader<'a> {
    /// Validate the file header and locate every page.
    pub fn new(data: &'a [u8]) -> Result<Self, CookieError> {
        if data.len() < 8 {
            return Err(CookieError::invalid_data("File too small"));
        }
        if &data[0..4] != MAGIC {
            return Err(CookieError::invalid_data(
                "Invalid magic bytes (not a Safari cookies file)",
            ));
        }

        let num_pages = read_u32_be(data, 4)? as usize;
        let mut position = num_pages
            .checked_mul(4)
            .and_then(|n| n.checked_add(8))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| CookieError::invalid_data("Page table extends beyond file"))?;

        let mut pages = Vec::with_capacity(num_pages);
        for i in 0..num_pages {
            let size = read_u32_be(data, 8 + i * 4)? as usize;
            let end = position
                .checked_add(size)
                .filter(|end| *end <= data.len())
                .ok_or_else(|| CookieError::invalid_data("Page extends beyond file"))?;
            pages.push((position, end));
            position = end;
        }

        Ok(Self {
            data,
            pages,
            next_page: 0,
            page: &[],
            offsets: Vec::new(),
            next_cookie: 0,
            failed: false,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&mut self, start: usize, end: usize) -> Result<(), CookieError> {
        let data: &'a [u8] = self.data;
        let page = &data[start..end];
        if page.len() < 8 {
            return Err(CookieError::invalid_data("Page too small"));
        }
        if read_u32_be(page, 0)? != PAGE_HEADER {
            return Err(CookieError::invalid_data("Invalid page header"));
        }

        let num_cookies = read_u32_le(page, 4)? as usize;
        let mut offsets = Vec::with_capacity(num_cookies.min(page.len() / 4));
        for i in 0..num_cookies {
            offsets.push(read_u32_le(page, 8 + i * 4)? as usize);
        }

        self.page = page;
        self.offsets = offsets;
        self.next_cookie = 0;
        Ok(())
    }

    fn next_record(&mut self) -> Option<Result<SafariRecord, CookieError>> {
        loop {
            if let Some(&offset) = self.offsets.get(self.next_cookie) {
                self.next_cookie += 1;
                return Some(parse_cookie(self.page, offset));
            }
            let (start, end) = *self.pages.get(self.next_page)?;
            self.next_page += 1;
            if let Err(e) = self.load_page(start, end) {
                return Some(Err(e));
            }
        }
    }
}

impl Iterator for BinaryCookieReader<'_> {
    type Item = Result<SafariRecord, CookieError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_record();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Parse the cookie starting at `offset` within `page`.
fn parse_cookie(page: &[u8], offset: usize) -> Result<SafariRecord, CookieError> {
    let size = read_u32_le(page, offset)? as usize;
    if size < COOKIE_HEADER_LEN {
        return Err(CookieError::invalid_data("Cookie record too small"));
    }
    let data = offset
        .checked_add(size)
        .and_then(|end| page.get(offset..end))
        .ok_or_else(|| CookieError::invalid_data("Cookie record extends beyond page"))?;

    let flags = read_u32_le(data, 8)?;
    let domain_offset = read_u32_le(data, 16)? as usize;
    let name_offset = read_u32_le(data, 20)? as usize;
    let path_offset = read_u32_le(data, 24)? as usize;
    let value_offset = read_u32_le(data, 28)? as usize;
    let expiry = read_f64_le(data, 40)?;
    let creation = read_f64_le(data, 48)?;

    Ok(SafariRecord {
        flags,
        domain: read_null_terminated(data, domain_offset)?,
        name: read_null_terminated(data, name_offset)?,
        path: read_null_terminated(data, path_offset)?,
        value: read_null_terminated(data, value_offset)?,
        expiry,
        creation,
    })
}

/// Decode one Safari record.
pub fn decode_record(record: &SafariRecord) -> Result<Cookie, CookieError> {
    let name = utf8(&record.name, "Name")?;
    let value = utf8(&record.value, "Value")?;
    let domain = utf8(&record.domain, "Domain")?;
    let path = utf8(&record.path, "Path")?;
    let expires = mac_absolute_time(record.expiry, "Expires")?;
    let creation = mac_absolute_time(record.creation, "Creation")?;

    Ok(Cookie {
        name,
        value,
        domain,
        path,
        expires,
        creation,
        secure: record.flags & FLAG_SECURE != 0,
        http_only: record.flags & FLAG_HTTP_ONLY != 0,
    })
}

fn utf8(bytes: &[u8], field: &'static str) -> Result<String, CookieError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| unexpected(field, &RawValue::Blob(bytes.to_vec())))
}

/// Convert Mac absolute time (seconds since 2001-01-01 UTC) to whole Unix seconds.
fn mac_absolute_time(timestamp: f64, field: &'static str) -> Result<OffsetDateTime, CookieError> {
    let raw = RawValue::Real(timestamp);
    if !timestamp.is_finite() || timestamp.abs() > i64::MAX as f64 / 2.0 {
        return Err(unexpected(field, &raw));
    }
    let unix_secs = (timestamp.trunc() as i64)
        .checked_add(MAC_TO_UNIX)
        .ok_or_else(|| unexpected(field, &raw))?;
    unix_time(unix_secs, field, &raw)
}

/// Decode every cookie in a binary cookies buffer accepted by `filters`.
pub fn decode_binary_cookies(
    data: &[u8],
    filters: &[&dyn Filter],
    mode: DecodeMode,
) -> Result<Vec<Cookie>, CookieError> {
    let mut walker = Walker::new(filters, mode);
    for record in BinaryCookieReader::new(data)? {
        walker.push(decode_record(&record?))?;
    }
    Ok(walker.finish(BROWSER))
}

/// Read all cookies accepted by `filters` from a `Cookies.binarycookies` file.
pub fn read_cookies(
    path: impl Into<PathBuf>,
    filters: &[&dyn Filter],
) -> Result<Vec<Cookie>, CookieError> {
    let mut store = SafariCookieStore::new(path);
    read_store(Some(&mut store), filters)
}

enum Source {
    File,
    Bytes(Vec<u8>),
}

pub struct SafariCookieStore {
    info: StoreInfo,
    source: Source,
    data: Option<Vec<u8>>,
    mode: DecodeMode,
}

impl SafariCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_info(StoreInfo::new(BROWSER, path).with_default_profile(true))
    }

    pub fn from_info(info: StoreInfo) -> Self {
        Self {
            info,
            source: Source::File,
            data: None,
            mode: DecodeMode::default(),
        }
    }

    /// A store over an in-memory copy of a binary cookies file.
    pub fn from_bytes(info: StoreInfo, bytes: Vec<u8>) -> Self {
        Self {
            info,
            source: Source::Bytes(bytes),
            data: None,
            mode: DecodeMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    fn read_open(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError> {
        self.open()?;
        let data = self.data.as_deref().ok_or(CookieError::DatabaseMissing)?;
        let mut walker = Walker::new(filters, self.mode);
        for record in BinaryCookieReader::new(data)? {
            walker.push(decode_record(&record?))?;
        }
        Ok(walker.finish(&self.info.browser))
    }
}

impl CookieStore for SafariCookieStore {
    fn info(&self) -> &StoreInfo {
        &self.info
    }

    fn open(&mut self) -> Result<(), CookieError> {
        if self.data.is_some() {
            return Ok(());
        }
        let data = match &self.source {
            Source::File => {
                std::fs::read(&self.info.file_name).store_context(&self.info.file_name)?
            }
            Source::Bytes(bytes) => bytes.clone(),
        };
        tracing::debug!(path = %self.info.file_name.display(), bytes = data.len(), "opened binary cookies");
        self.data = Some(data);
        Ok(())
    }

    fn read_cookies(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError> {
        let result = self.read_open(filters);
        self.close();
        result
    }

    fn close(&mut self) {
        self.data = None;
    }
}

/// Read a 32-bit unsigned integer in big-endian.
fn read_u32_be(data: &[u8], at: usize) -> Result<u32, CookieError> {
    read_array(data, at).map(u32::from_be_bytes)
}

/// Read a 32-bit unsigned integer in little-endian.
fn read_u32_le(data: &[u8], at: usize) -> Result<u32, CookieError> {
    read_array(data, at).map(u32::from_le_bytes)
}

/// Read a 64-bit float in little-endian.
fn read_f64_le(data: &[u8], at: usize) -> Result<f64, CookieError> {
    read_array(data, at).map(f64::from_le_bytes)
}

fn read_array<const N: usize>(data: &[u8], at: usize) -> Result<[u8; N], CookieError> {
    at.checked_add(N)
        .and_then(|end| data.get(at..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| CookieError::invalid_data("Unexpected EOF"))
}

/// Read a null-terminated string from the data.
fn read_null_terminated(data: &[u8], offset: usize) -> Result<Vec<u8>, CookieError> {
    let slice = data
        .get(offset..)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CookieError::invalid_data("String offset out of bounds"))?;
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
    Ok(slice[..end].to_vec())
}
