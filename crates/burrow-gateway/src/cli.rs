use burrow_telemetry::LogFormat;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "BURROW_BASE_URL";
pub const DEFAULT_DURATION_HOURS_ENV: &str = "BURROW_DEFAULT_DURATION_HOURS";
pub const CODE_LENGTH_ENV: &str = "BURROW_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "BURROW_MAX_ATTEMPTS";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BURROW_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "BURROW_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "BURROW_REDIS_URL";
pub const CACHE_CAPACITY_ENV: &str = "BURROW_CACHE_CAPACITY";
pub const CLEANUP_INTERVAL_ENV: &str = "BURROW_CLEANUP_INTERVAL_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "BURROW_REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway", about = "HTTP gateway for the Burrow URL shortener")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public base URL that short codes are appended to.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Lifetime of a short URL when the request gives no duration.
    #[arg(
        long,
        env = DEFAULT_DURATION_HOURS_ENV,
        default_value_t = 24,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub default_duration_hours: u32,

    /// Length of generated codes; stays within the custom alias bounds so
    /// every code is routable.
    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(4..=10)
    )]
    pub code_length: u8,

    /// Upper bound on generated-code attempts per request.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = burrow_shortener::config::DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    /// Maximum number of entries held by the in-process cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 10_000)]
    pub cache_capacity: u64,

    /// Seconds between purges of expired records; 0 disables purging.
    #[arg(long, env = CLEANUP_INTERVAL_ENV, default_value_t = 300)]
    pub cleanup_interval_secs: u64,

    #[arg(
        long,
        env = REQUEST_TIMEOUT_ENV,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
