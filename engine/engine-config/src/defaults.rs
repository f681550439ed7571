//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary and the
//! checked-in documentation of every setting can never drift apart.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    web: WebDefaults,
    lobby: LobbyDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct WebDefaults {
    host: String,
    port: u16,
    static_dir: String,
    html_dir: String,
    allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LobbyDefaults {
    default_players: usize,
    max_players: usize,
    keepalive_interval_secs: u64,
    lobby_timeout_secs: u64,
    play_again_timeout_secs: u64,
    game_id_length: usize,
    create_on_join: bool,
    outbound_buffer: usize,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Web
pub fn host() -> &'static str {
    &DEFAULTS.web.host
}
pub fn port() -> u16 {
    DEFAULTS.web.port
}
pub fn static_dir() -> &'static str {
    &DEFAULTS.web.static_dir
}
pub fn html_dir() -> &'static str {
    &DEFAULTS.web.html_dir
}
pub fn allowed_origins() -> &'static [String] {
    &DEFAULTS.web.allowed_origins
}

// Lobby
pub fn default_players() -> usize {
    DEFAULTS.lobby.default_players
}
pub fn max_players() -> usize {
    DEFAULTS.lobby.max_players
}
pub fn keepalive_interval_secs() -> u64 {
    DEFAULTS.lobby.keepalive_interval_secs
}
pub fn lobby_timeout_secs() -> u64 {
    DEFAULTS.lobby.lobby_timeout_secs
}
pub fn play_again_timeout_secs() -> u64 {
    DEFAULTS.lobby.play_again_timeout_secs
}
pub fn game_id_length() -> usize {
    DEFAULTS.lobby.game_id_length
}
pub fn create_on_join() -> bool {
    DEFAULTS.lobby.create_on_join
}
pub fn outbound_buffer() -> usize {
    DEFAULTS.lobby.outbound_buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Just accessing these will verify the TOML parses correctly
        assert_eq!(log_level(), "info");
        assert_eq!(host(), "0.0.0.0");
        assert_eq!(port(), 8292);
        assert!(allowed_origins().is_empty());
    }

    #[test]
    fn test_lobby_defaults() {
        assert_eq!(default_players(), 2);
        assert_eq!(max_players(), 6);
        assert_eq!(keepalive_interval_secs(), 30);
        assert_eq!(lobby_timeout_secs(), 600);
        assert_eq!(play_again_timeout_secs(), 60);
        assert_eq!(game_id_length(), 8);
        assert!(!create_on_join());
        assert_eq!(outbound_buffer(), 64);
    }
}
