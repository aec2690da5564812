//! Repository implementations for Burrow.

pub mod memory;
pub mod mysql;

pub use burrow_core::{Repository, StorageError, UrlRecord};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
