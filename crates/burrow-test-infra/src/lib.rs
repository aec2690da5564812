//! Disposable MySQL and Redis servers for integration tests.

pub mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};
pub use mysql::{MySqlServer, MysqlConfig};
pub use self::redis::RedisServer;
