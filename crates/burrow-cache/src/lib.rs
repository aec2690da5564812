//! [`UrlCache`] implementations for Burrow.

pub mod moka;
pub mod redis;

pub use self::moka::{CacheConfig, MokaUrlCache};
pub use self::redis::RedisUrlCache;
pub use burrow_core::{CacheError, UrlCache};
