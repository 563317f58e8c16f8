use thiserror::Error;

/// Errors raised while opening, resolving, or decoding a cookie store.
///
/// Every variant is fatal to the `read_cookies` call that produced it; the
/// only non-error outcome for a dropped record is a rejecting filter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CookieError {
    // Lifecycle Errors
    #[error("cookie store is nil")]
    StoreMissing,
    #[error("database is nil")]
    DatabaseMissing,
    #[error("cookie database is locked")]
    DatabaseLocked,
    #[error("cookie store not found: {path}")]
    StoreNotFound { path: String },
    #[error("no cookie store finder registered for {browser}")]
    UnknownBrowser { browser: String },

    // Structural Errors
    #[error("column index out of bound (index {index}, record has {len} values)")]
    ColumnIndexOutOfBound { index: usize, len: usize },
    #[error("no column mapped for {column}")]
    MissingColumn { column: String },
    #[error("invalid cookie data: {reason}")]
    InvalidData { reason: String },

    // Typed Value Errors
    #[error("got unexpected value for {field} {value} (type {kind})")]
    UnexpectedValue {
        field: &'static str,
        value: String,
        kind: &'static str,
    },
    #[error("cookie {name} on {host} has an encrypted value and no decryptor is configured")]
    EncryptedValue { name: String, host: String },

    // Collaborator Errors
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("cookie database error: {message}")]
    Database { message: String },
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl CookieError {
    /// Create an invalid data error.
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        CookieError::InvalidData {
            reason: reason.into(),
        }
    }

    /// Create a store-not-found error.
    pub fn store_not_found(path: impl Into<String>) -> Self {
        CookieError::StoreNotFound { path: path.into() }
    }

    /// Whether the error is attributable to a single malformed record rather
    /// than to the store as a whole.
    ///
    /// Lenient reads skip these; everything else still aborts.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            CookieError::ColumnIndexOutOfBound { .. }
                | CookieError::MissingColumn { .. }
                | CookieError::UnexpectedValue { .. }
                | CookieError::EncryptedValue { .. }
        )
    }
}

impl From<std::io::Error> for CookieError {
    fn from(err: std::io::Error) -> Self {
        CookieError::Io {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for CookieError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ffi::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ffi::ErrorCode::DatabaseLocked =>
            {
                CookieError::DatabaseLocked
            }
            _ => CookieError::Database {
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CookieError {
    fn from(err: serde_json::Error) -> Self {
        CookieError::Serialization {
            message: err.to_string(),
        }
    }
}
