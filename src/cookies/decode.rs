//! Typed coercions shared by the record decoders.
//!
//! Each helper either yields the strict output type or a
//! `CookieError::UnexpectedValue` naming the field, the offending value and
//! its observed storage type.

use crate::base::cookieerror::CookieError;
use crate::cookies::value::RawValue;
use time::OffsetDateTime;

pub(crate) fn unexpected(field: &'static str, value: &RawValue) -> CookieError {
    CookieError::UnexpectedValue {
        field,
        value: value.to_string(),
        kind: value.kind(),
    }
}

pub(crate) fn text(value: &RawValue, field: &'static str) -> Result<String, CookieError> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| unexpected(field, value))
}

/// Stored booleans are non-negative integers; anything above zero is true.
pub(crate) fn flag(value: &RawValue, field: &'static str) -> Result<bool, CookieError> {
    value
        .as_integer()
        .map(|v| v > 0)
        .ok_or_else(|| unexpected(field, value))
}

/// Absolute time `secs` seconds past the Unix epoch.
pub(crate) fn unix_time(
    secs: i64,
    field: &'static str,
    value: &RawValue,
) -> Result<OffsetDateTime, CookieError> {
    OffsetDateTime::from_unix_timestamp(secs).map_err(|_| unexpected(field, value))
}
