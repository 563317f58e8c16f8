//! Cookie store discovery.
//!
//! A [`CookieStoreFinder`] locates the store files of one browser family and
//! hands them back as unopened [`CookieStore`]s. Finders are collected in a
//! [`FinderRegistry`] built by the caller; nothing is registered globally.
//!
//! Default locations:
//!
//! | Browser  | Linux                      | macOS                                      | Windows                              |
//! |----------|----------------------------|--------------------------------------------|--------------------------------------|
//! | Firefox  | `~/.mozilla/firefox`       | `~/Library/Application Support/Firefox`    | `%APPDATA%\Mozilla\Firefox`          |
//! | Chrome   | `~/.config/google-chrome`  | `~/Library/Application Support/Google/Chrome` | `%LOCALAPPDATA%\Google\Chrome\User Data` |
//! | Chromium | `~/.config/chromium`       | `~/Library/Application Support/Chromium`   | `%LOCALAPPDATA%\Chromium\User Data`  |
//! | Safari   |                            | `~/Library/Cookies/Cookies.binarycookies`  |                                      |

use crate::base::cookieerror::CookieError;
use crate::cookies::chrome::ChromeCookieStore;
use crate::cookies::cookie::Cookie;
use crate::cookies::filter::Filter;
use crate::cookies::firefox::FirefoxCookieStore;
use crate::cookies::safari::SafariCookieStore;
use crate::cookies::store::{read_store, CookieStore, StoreInfo};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Locates the cookie store files of one browser family.
pub trait CookieStoreFinder {
    fn find_cookie_stores(&self) -> Result<Vec<Box<dyn CookieStore>>, CookieError>;
}

fn env_dir(var: &str) -> Result<PathBuf, CookieError> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| CookieError::Io {
            message: format!("{var} is not set"),
        })
}

fn home_dir() -> Result<PathBuf, CookieError> {
    env_dir(if cfg!(windows) { "USERPROFILE" } else { "HOME" })
}

/// Firefox profiles, read from `profiles.ini`.
#[derive(Debug, Clone, Default)]
pub struct FirefoxFinder {
    root: Option<PathBuf>,
}

impl FirefoxFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for `profiles.ini` and profile directories under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn root(&self) -> Result<PathBuf, CookieError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        if cfg!(target_os = "windows") {
            Ok(env_dir("APPDATA")?.join("Mozilla").join("Firefox"))
        } else if cfg!(target_os = "macos") {
            Ok(home_dir()?
                .join("Library")
                .join("Application Support")
                .join("Firefox"))
        } else {
            Ok(home_dir()?.join(".mozilla").join("firefox"))
        }
    }
}

/// One `[ProfileN]` section of `profiles.ini`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirefoxProfile {
    pub name: String,
    pub path: PathBuf,
    pub is_default: bool,
}

/// Parse `profiles.ini`, resolving relative profile paths against `root`.
///
/// A profile is the default when its section says `Default=1` or when an
/// `[Install...]` section points at it.
pub fn parse_profiles_ini(contents: &str, root: &Path) -> Vec<FirefoxProfile> {
    let mut profiles = Vec::new();
    let mut install_defaults = Vec::new();

    let mut section = String::new();
    let mut current: Option<(FirefoxProfile, bool)> = None;

    let mut flush = |current: &mut Option<(FirefoxProfile, bool)>| {
        if let Some((mut profile, relative)) = current.take() {
            if profile.path.as_os_str().is_empty() {
                return;
            }
            if relative {
                profile.path = root.join(&profile.path);
            }
            profiles.push(profile);
        }
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            flush(&mut current);
            section = name.to_string();
            if section.starts_with("Profile") {
                current = Some((FirefoxProfile::default(), true));
            }
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if section.starts_with("Install") && key == "Default" {
            install_defaults.push(value.to_string());
            continue;
        }
        if let Some((profile, relative)) = current.as_mut() {
            match key {
                "Name" => profile.name = value.to_string(),
                "Path" => profile.path = PathBuf::from(value),
                "IsRelative" => *relative = value == "1",
                "Default" => profile.is_default = value == "1",
                _ => {}
            }
        }
    }
    flush(&mut current);

    for default in install_defaults {
        let path = root.join(&default);
        for profile in profiles.iter_mut() {
            if profile.path == path || profile.path == Path::new(&default) {
                profile.is_default = true;
            }
        }
    }
    profiles
}

/// Profile directories holding a `cookies.sqlite`, for installs without `profiles.ini`.
fn scan_firefox_profiles(root: &Path) -> Vec<FirefoxProfile> {
    let mut profiles = Vec::new();
    for dir in [root.to_path_buf(), root.join("Profiles")] {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.join("cookies.sqlite").is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let is_default = name.ends_with(".default") || name.ends_with(".default-release");
            profiles.push(FirefoxProfile {
                name,
                path,
                is_default,
            });
        }
    }
    profiles.sort_by(|a, b| a.path.cmp(&b.path));
    profiles
}

impl CookieStoreFinder for FirefoxFinder {
    fn find_cookie_stores(&self) -> Result<Vec<Box<dyn CookieStore>>, CookieError> {
        let root = self.root()?;
        let profiles = match std::fs::read_to_string(root.join("profiles.ini")) {
            Ok(contents) => parse_profiles_ini(&contents, &root),
            Err(_) => scan_firefox_profiles(&root),
        };

        let stores: Vec<Box<dyn CookieStore>> = profiles
            .into_iter()
            .map(|profile| {
                let info = StoreInfo::new(crate::cookies::firefox::BROWSER, profile.path.join("cookies.sqlite"))
                    .with_profile(profile.name)
                    .with_default_profile(profile.is_default);
                Box::new(FirefoxCookieStore::from_info(info)) as Box<dyn CookieStore>
            })
            .filter(|store| store.file_name().is_file())
            .collect();
        tracing::debug!(root = %root.display(), stores = stores.len(), "found firefox cookie stores");
        Ok(stores)
    }
}

/// Chrome-family profiles under one user-data directory.
#[derive(Debug, Clone)]
pub struct ChromeFinder {
    browser: &'static str,
    root: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn chrome() -> Self {
        Self {
            browser: "chrome",
            root: None,
        }
    }

    pub fn chromium() -> Self {
        Self {
            browser: "chromium",
            root: None,
        }
    }

    /// Use `root` as the user-data directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn browser(&self) -> &'static str {
        self.browser
    }

    fn root(&self) -> Result<PathBuf, CookieError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let chromium = self.browser == "chromium";
        if cfg!(target_os = "windows") {
            let base = env_dir("LOCALAPPDATA")?;
            let vendor = if chromium {
                base.join("Chromium")
            } else {
                base.join("Google").join("Chrome")
            };
            Ok(vendor.join("User Data"))
        } else if cfg!(target_os = "macos") {
            let base = home_dir()?.join("Library").join("Application Support");
            Ok(if chromium {
                base.join("Chromium")
            } else {
                base.join("Google").join("Chrome")
            })
        } else {
            let base = home_dir()?.join(".config");
            Ok(base.join(if chromium { "chromium" } else { "google-chrome" }))
        }
    }
}

fn is_chrome_profile_dir(name: &str) -> bool {
    name == "Default"
        || name
            .strip_prefix("Profile ")
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// The cookie database of a profile: `Network/Cookies` on current builds, `Cookies` before.
fn chrome_cookie_file(profile_dir: &Path) -> Option<PathBuf> {
    [
        profile_dir.join("Network").join("Cookies"),
        profile_dir.join("Cookies"),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

impl CookieStoreFinder for ChromeFinder {
    fn find_cookie_stores(&self) -> Result<Vec<Box<dyn CookieStore>>, CookieError> {
        let root = self.root()?;
        let Ok(entries) = std::fs::read_dir(&root) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !is_chrome_profile_dir(&name) {
                    return None;
                }
                chrome_cookie_file(&entry.path()).map(|file| (name, file))
            })
            .collect();
        found.sort();

        let stores: Vec<Box<dyn CookieStore>> = found
            .into_iter()
            .map(|(profile, file)| {
                let info = StoreInfo::new(self.browser, file)
                    .with_default_profile(profile == "Default")
                    .with_profile(profile);
                Box::new(ChromeCookieStore::from_info(info)) as Box<dyn CookieStore>
            })
            .collect();
        tracing::debug!(browser = self.browser, root = %root.display(), stores = stores.len(), "found chrome cookie stores");
        Ok(stores)
    }
}

/// The single per-user Safari store.
#[derive(Debug, Clone, Default)]
pub struct SafariFinder {
    home: Option<PathBuf>,
}

impl SafariFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `Library/Cookies` under `home` instead of the user's home.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl CookieStoreFinder for SafariFinder {
    fn find_cookie_stores(&self) -> Result<Vec<Box<dyn CookieStore>>, CookieError> {
        let home = match &self.home {
            Some(home) => home.clone(),
            None => home_dir()?,
        };
        let file = home
            .join("Library")
            .join("Cookies")
            .join("Cookies.binarycookies");
        let info = StoreInfo::new(crate::cookies::safari::BROWSER, file).with_default_profile(true);
        Ok(vec![Box::new(SafariCookieStore::from_info(info))])
    }
}

/// Outcome of reading one discovered store.
#[derive(Debug)]
pub struct StoreReadout {
    pub info: StoreInfo,
    pub result: Result<Vec<Cookie>, CookieError>,
}

/// Browser tag to finder mapping, owned by the caller.
#[derive(Default)]
pub struct FinderRegistry {
    finders: BTreeMap<String, Box<dyn CookieStoreFinder>>,
}

impl FinderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Firefox, Chrome, Chromium and (on macOS) Safari at their default locations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new()
            .register(crate::cookies::firefox::BROWSER, FirefoxFinder::new())
            .register("chrome", ChromeFinder::chrome())
            .register("chromium", ChromeFinder::chromium());
        if cfg!(target_os = "macos") {
            registry = registry.register(crate::cookies::safari::BROWSER, SafariFinder::new());
        }
        registry
    }

    /// Register `finder` under `browser`, replacing any earlier one.
    pub fn register(
        mut self,
        browser: impl Into<String>,
        finder: impl CookieStoreFinder + 'static,
    ) -> Self {
        self.finders.insert(browser.into(), Box::new(finder));
        self
    }

    pub fn get(&self, browser: &str) -> Option<&dyn CookieStoreFinder> {
        self.finders.get(browser).map(|f| f.as_ref())
    }

    pub fn browsers(&self) -> Vec<&str> {
        self.finders.keys().map(String::as_str).collect()
    }

    pub fn find_cookie_stores(
        &self,
        browser: &str,
    ) -> Result<Vec<Box<dyn CookieStore>>, CookieError> {
        self.get(browser)
            .ok_or_else(|| CookieError::UnknownBrowser {
                browser: browser.to_string(),
            })?
            .find_cookie_stores()
    }

    /// Stores of every registered browser. A failing finder is logged and skipped.
    pub fn find_all_cookie_stores(&self) -> Vec<Box<dyn CookieStore>> {
        let mut stores = Vec::new();
        for (browser, finder) in &self.finders {
            match finder.find_cookie_stores() {
                Ok(found) => stores.extend(found),
                Err(e) => tracing::warn!(browser = %browser, error = %e, "cookie store discovery failed"),
            }
        }
        stores
    }

    /// Read every discovered store, keeping each store's outcome.
    pub fn read_all_cookies(&self, filters: &[&dyn Filter]) -> Vec<StoreReadout> {
        self.find_all_cookie_stores()
            .into_iter()
            .map(|mut store| {
                let result = read_store(Some(store.as_mut()), filters);
                StoreReadout {
                    info: store.info().clone(),
                    result,
                }
            })
            .collect()
    }
}
