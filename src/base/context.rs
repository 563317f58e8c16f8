//! Ergonomic error context helpers.
//!
//! Provides an extension trait for attaching the store path to IO failures,
//! so a missing cookie file surfaces as `CookieError::StoreNotFound`.

use crate::base::cookieerror::CookieError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add cookie store context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use browsercookies::base::context::IoResultExt;
    ///
    /// let data = std::fs::read(&path).store_context(&path)?;
    /// // Error: "cookie store not found: /home/me/Library/Cookies/Cookies.binarycookies"
    /// ```
    fn store_context(self, path: &Path) -> Result<T, CookieError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn store_context(self, path: &Path) -> Result<T, CookieError> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CookieError::store_not_found(path.display().to_string()),
            _ => CookieError::Io {
                message: format!("{}: {}", path.display(), e),
            },
        })
    }
}
