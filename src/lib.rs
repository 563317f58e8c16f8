//! # browsercookies
//!
//! Read cookies out of the on-disk stores of Firefox, Chrome/Chromium and
//! Safari, normalized into one [`Cookie`](cookies::Cookie) type.
//!
//! ## Features
//!
//! - **Schema tolerant**: SQLite column positions are resolved from the live
//!   schema, with fallbacks for older layouts
//! - **Fail-fast decoding**: a record of the wrong type fails the read with a
//!   typed error; [`DecodeMode::Lenient`](cookies::DecodeMode) opts into skipping
//! - **Filters**: any `Fn(&Cookie) -> bool` narrows the result
//! - **Discovery**: per-profile store lookup through a caller-owned registry
//! - **Export**: Netscape `cookies.txt` and JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use browsercookies::cookies::{filter, firefox};
//!
//! let cookies = firefox::read_cookies("cookies.sqlite", &[&filter::name("session")])?;
//! for cookie in &cookies {
//!     println!("{} = {} ({})", cookie.name, cookie.value, cookie.domain);
//! }
//! # Ok::<(), browsercookies::base::cookieerror::CookieError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and I/O context helpers
//! - [`cookies`] - Containers, decoders, stores, filters and discovery
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod base;
pub mod cookies;
