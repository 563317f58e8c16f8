//! The open/read/close lifecycle shared by every cookie store.
//!
//! A store is one physical file. It opens its container lazily on first
//! use, releases it when a read returns (on every path), and may be closed
//! again at any time. Stores share no state, so extracting from several
//! files concurrently means one store per file.

use crate::base::cookieerror::CookieError;
use crate::cookies::container::{Container, MemoryContainer, SqliteContainer};
use crate::cookies::cookie::Cookie;
use crate::cookies::filter::Filter;
use std::path::{Path, PathBuf};

/// Identity of a cookie store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub browser: String,
    pub profile: String,
    pub is_default_profile: bool,
    pub file_name: PathBuf,
}

impl StoreInfo {
    pub fn new(browser: impl Into<String>, file_name: impl Into<PathBuf>) -> Self {
        Self {
            browser: browser.into(),
            profile: String::new(),
            is_default_profile: false,
            file_name: file_name.into(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_default_profile(mut self, is_default: bool) -> Self {
        self.is_default_profile = is_default;
        self
    }
}

/// A browser-family cookie store.
pub trait CookieStore {
    fn info(&self) -> &StoreInfo;

    /// Open the underlying container if it is not open yet.
    fn open(&mut self) -> Result<(), CookieError>;

    /// Decode every stored cookie accepted by all `filters`.
    ///
    /// The container is closed before this returns, whatever the outcome.
    fn read_cookies(&mut self, filters: &[&dyn Filter]) -> Result<Vec<Cookie>, CookieError>;

    /// Release the container. Safe to call when nothing was opened.
    fn close(&mut self);

    fn browser(&self) -> &str {
        &self.info().browser
    }

    fn profile(&self) -> &str {
        &self.info().profile
    }

    fn is_default_profile(&self) -> bool {
        self.info().is_default_profile
    }

    fn file_name(&self) -> &Path {
        &self.info().file_name
    }
}

/// Read `store` and close it, on every exit path.
///
/// Fails with `CookieError::StoreMissing` when no store is given.
pub fn read_store(
    store: Option<&mut dyn CookieStore>,
    filters: &[&dyn Filter],
) -> Result<Vec<Cookie>, CookieError> {
    let store = store.ok_or(CookieError::StoreMissing)?;
    let mut guard = CloseGuard { store };
    guard.store.read_cookies(filters)
}

struct CloseGuard<'a> {
    store: &'a mut dyn CookieStore,
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.store.close();
    }
}

/// Where a table-shaped store gets its container from.
#[derive(Debug, Clone)]
pub(crate) enum ContainerSource {
    File(PathBuf),
    Memory(MemoryContainer),
}

/// Lazily opened container slot for table-shaped stores.
pub(crate) struct DatabaseHandle {
    source: ContainerSource,
    database: Option<Box<dyn Container>>,
}

impl DatabaseHandle {
    pub fn new(source: ContainerSource) -> Self {
        Self {
            source,
            database: None,
        }
    }

    pub fn open(&mut self) -> Result<(), CookieError> {
        if self.database.is_some() {
            return Ok(());
        }
        let database: Box<dyn Container> = match &self.source {
            ContainerSource::File(path) => Box::new(SqliteContainer::open(path)?),
            ContainerSource::Memory(container) => Box::new(container.clone()),
        };
        self.database = Some(database);
        Ok(())
    }

    pub fn database(&self) -> Result<&dyn Container, CookieError> {
        self.database.as_deref().ok_or(CookieError::DatabaseMissing)
    }

    pub fn close(&mut self) {
        if let Some(database) = self.database.take() {
            if let Err(e) = database.close() {
                tracing::warn!(error = %e, "failed to close cookie database");
            }
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.database.is_some()
    }
}
