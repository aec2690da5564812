//! HTTP front end for the Burrow URL shortener.
//!
//! [`App::router`] builds the axum router over any
//! [`Shortener`](burrow_shortener::Shortener); the binary in `main.rs`
//! wires it to the configured storage and cache backends.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod tasks;

pub use app::App;
pub use state::AppState;
