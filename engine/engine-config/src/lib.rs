//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across the Dropline crates (lobby engine, web gateway).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`DROPLINE_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! DROPLINE_<SECTION>_<KEY>=value
//!
//! Examples:
//!     DROPLINE_COMMON_LOG_LEVEL=debug
//!     DROPLINE_WEB_HOST=127.0.0.1
//!     DROPLINE_WEB_PORT=3000
//!     DROPLINE_LOBBY_MAX_PLAYERS=4
//!     DROPLINE_WEB_ALLOWED_ORIGINS=https://a.example,https://b.example
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
