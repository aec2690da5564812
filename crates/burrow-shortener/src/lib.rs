//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which allocates short codes,
//! persists records to a [`Repository`](burrow_core::Repository) and keeps a
//! [`UrlCache`](burrow_core::UrlCache) in front of it for redirects.

pub mod config;
pub mod error;
pub mod service;
pub mod shortener;

pub use config::ShortenerConfig;
pub use error::ShortenerError;
pub use service::ShortenerService;
pub use shortener::{CreatedUrl, ExpirationPolicy, ShortenParams, Shortener};
