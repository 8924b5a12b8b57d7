//! Derd CLI
//!
//! Drives the journal, offline queue, feed and habit features against
//! file-backed stores, for development and scripting.

pub mod app;
pub mod config;

pub use app::App;
pub use config::{ConfigError, DerdConfig};
