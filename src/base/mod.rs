//! Base types and error handling.
//!
//! Provides the foundational types shared by every store implementation:
//! - [`CookieError`](cookieerror::CookieError): lifecycle, structural, typed-value
//!   and collaborator errors
//! - [`IoResultExt`](context::IoResultExt): path context for IO failures

pub mod context;
pub mod cookieerror;
