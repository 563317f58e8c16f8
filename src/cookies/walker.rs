//! Store walking: decode, filter, accumulate.
//!
//! The walker sees every decoded record of a store in the container's
//! natural order. Decoded cookies pass through the caller's filters;
//! decode failures abort the walk unless the store runs in
//! [`DecodeMode::Lenient`].

use crate::base::cookieerror::CookieError;
use crate::cookies::container::Container;
use crate::cookies::cookie::Cookie;
use crate::cookies::filter::{filter_cookie, Filter};
use crate::cookies::value::Record;

/// How a store reacts to a record that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// The first bad record fails the whole read.
    #[default]
    Strict,
    /// Records with structural or typed-value errors are logged and skipped.
    /// Container and lifecycle errors still fail the read.
    Lenient,
}

pub(crate) struct Walker<'a> {
    filters: &'a [&'a dyn Filter],
    mode: DecodeMode,
    cookies: Vec<Cookie>,
    filtered: usize,
    skipped: usize,
}

impl<'a> Walker<'a> {
    pub fn new(filters: &'a [&'a dyn Filter], mode: DecodeMode) -> Self {
        Self {
            filters,
            mode,
            cookies: Vec::new(),
            filtered: 0,
            skipped: 0,
        }
    }

    /// Feed the outcome of decoding one record.
    pub fn push(&mut self, decoded: Result<Cookie, CookieError>) -> Result<(), CookieError> {
        match decoded {
            Ok(cookie) => {
                if filter_cookie(&cookie, self.filters) {
                    self.cookies.push(cookie);
                } else {
                    self.filtered += 1;
                }
                Ok(())
            }
            Err(err) if self.mode == DecodeMode::Lenient && err.is_record_error() => {
                tracing::warn!(error = %err, "skipping undecodable cookie record");
                self.skipped += 1;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn finish(self, browser: &str) -> Vec<Cookie> {
        tracing::debug!(
            browser,
            count = self.cookies.len(),
            filtered = self.filtered,
            skipped = self.skipped,
            "read cookie store"
        );
        self.cookies
    }
}

/// Walk every record of `table`, decoding each with `decode`.
pub(crate) fn walk_table<F>(
    container: &dyn Container,
    table: &str,
    walker: &mut Walker<'_>,
    mut decode: F,
) -> Result<(), CookieError>
where
    F: FnMut(&Record) -> Result<Cookie, CookieError>,
{
    container.visit_table_records(table, &mut |record| walker.push(decode(&record)))
}
