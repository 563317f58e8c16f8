//! Browser cookie store decoding.
//!
//! Every supported browser family stores cookies differently. This module
//! turns each store into the same [`Cookie`](cookie::Cookie) value:
//!
//! - **Firefox**: `cookies.sqlite`, table `moz_cookies` ([`firefox`])
//! - **Chrome/Chromium**: `Cookies`, table `cookies` ([`chrome`])
//! - **Safari**: `Cookies.binarycookies` ([`safari`])
//!
//! # Architecture
//!
//! | Stage | Type | Responsibility |
//! |-------|------|----------------|
//! | Container | [`Container`](container::Container) | Tables, column names, raw records |
//! | Schema | `ColumnMap` | Logical field → column index, with fallbacks |
//! | Decoder | `decode_record` per browser | Typed, fail-fast record decoding |
//! | Walker | [`DecodeMode`](walker::DecodeMode) | Filtering and accumulation |
//! | Store | [`CookieStore`](store::CookieStore) | Open / read / close lifecycle |
//! | Discovery | [`FinderRegistry`](finder::FinderRegistry) | Locating store files per profile |
//!
//! # Reading a single store
//!
//! ```rust,no_run
//! use browsercookies::cookies::{filter, firefox};
//!
//! let cookies = firefox::read_cookies(
//!     "/home/me/.mozilla/firefox/abcd.default-release/cookies.sqlite",
//!     &[&filter::domain_has_suffix("example.com"), &filter::valid],
//! )?;
//! println!("Found {} cookies", cookies.len());
//! # Ok::<(), browsercookies::base::cookieerror::CookieError>(())
//! ```
//!
//! # Reading every store on the machine
//!
//! ```rust,no_run
//! use browsercookies::cookies::finder::FinderRegistry;
//!
//! let registry = FinderRegistry::with_defaults();
//! for readout in registry.read_all_cookies(&[]) {
//!     match readout.result {
//!         Ok(cookies) => println!("{}: {} cookies", readout.info.file_name.display(), cookies.len()),
//!         Err(e) => eprintln!("{}: {}", readout.info.file_name.display(), e),
//!     }
//! }
//! ```
//!
//! # Export to Netscape Format (curl/wget compatible)
//!
//! ```rust,no_run
//! use browsercookies::cookies::{chrome, export};
//!
//! let cookies = chrome::read_cookies("/home/me/.config/chromium/Default/Cookies", &[])?;
//! std::fs::write("cookies.txt", export::to_netscape(&cookies))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chrome;
pub mod container;
pub mod cookie;
mod decode;
pub mod export;
pub mod filter;
pub mod finder;
pub mod firefox;
pub mod psl;
pub mod safari;
pub(crate) mod schema;
pub mod store;
pub mod value;
pub mod walker;

pub use cookie::Cookie;
pub use filter::Filter;
pub use finder::{CookieStoreFinder, FinderRegistry};
pub use store::{read_store, CookieStore, StoreInfo};
pub use walker::DecodeMode;
