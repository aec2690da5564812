//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the record type, the short code newtype and the
//! storage/cache contracts shared by the shortener service and the
//! backend implementations.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;

pub use cache::{ttl_until, UrlCache};
pub use error::{CacheError, InvalidShortCode, StorageError};
pub use repository::{Repository, UrlRecord};
pub use shortcode::ShortCode;
