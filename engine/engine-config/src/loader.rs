//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from web/)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by DROPLINE_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("DROPLINE_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from DROPLINE_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "DROPLINE_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u16, u64, usize, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Comma separated list
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: DROPLINE_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "DROPLINE_COMMON_LOG_LEVEL");

    // Web
    env_override!(config, web.host, "DROPLINE_WEB_HOST");
    env_override!(config, web.port, "DROPLINE_WEB_PORT", parse);
    env_override!(config, web.static_dir, "DROPLINE_WEB_STATIC_DIR");
    env_override!(config, web.html_dir, "DROPLINE_WEB_HTML_DIR");
    env_override!(
        config,
        web.allowed_origins,
        "DROPLINE_WEB_ALLOWED_ORIGINS",
        list
    );

    // Lobby
    env_override!(
        config,
        lobby.default_players,
        "DROPLINE_LOBBY_DEFAULT_PLAYERS",
        parse
    );
    env_override!(
        config,
        lobby.max_players,
        "DROPLINE_LOBBY_MAX_PLAYERS",
        parse
    );
    env_override!(
        config,
        lobby.keepalive_interval_secs,
        "DROPLINE_LOBBY_KEEPALIVE_INTERVAL_SECS",
        parse
    );
    env_override!(
        config,
        lobby.lobby_timeout_secs,
        "DROPLINE_LOBBY_LOBBY_TIMEOUT_SECS",
        parse
    );
    env_override!(
        config,
        lobby.play_again_timeout_secs,
        "DROPLINE_LOBBY_PLAY_AGAIN_TIMEOUT_SECS",
        parse
    );
    env_override!(
        config,
        lobby.game_id_length,
        "DROPLINE_LOBBY_GAME_ID_LENGTH",
        parse
    );
    env_override!(
        config,
        lobby.create_on_join,
        "DROPLINE_LOBBY_CREATE_ON_JOIN",
        parse
    );
    env_override!(
        config,
        lobby.outbound_buffer,
        "DROPLINE_LOBBY_OUTBOUND_BUFFER",
        parse
    );

    config
}
