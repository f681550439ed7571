//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;
use std::time::Duration;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_host() -> String {
    defaults::host().into()
}
fn d_port() -> u16 {
    defaults::port()
}
fn d_static_dir() -> String {
    defaults::static_dir().into()
}
fn d_html_dir() -> String {
    defaults::html_dir().into()
}
fn d_allowed_origins() -> Vec<String> {
    defaults::allowed_origins().to_vec()
}
fn d_default_players() -> usize {
    defaults::default_players()
}
fn d_max_players() -> usize {
    defaults::max_players()
}
fn d_keepalive_interval() -> u64 {
    defaults::keepalive_interval_secs()
}
fn d_lobby_timeout() -> u64 {
    defaults::lobby_timeout_secs()
}
fn d_play_again_timeout() -> u64 {
    defaults::play_again_timeout_secs()
}
fn d_game_id_length() -> usize {
    defaults::game_id_length()
}
fn d_create_on_join() -> bool {
    defaults::create_on_join()
}
fn d_outbound_buffer() -> usize {
    defaults::outbound_buffer()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub lobby: LobbyConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    /// Directory served under /static
    #[serde(default = "d_static_dir")]
    pub static_dir: String,
    /// Directory holding home.html and game.html
    #[serde(default = "d_html_dir")]
    pub html_dir: String,
    /// CORS allowed origins. Empty = allow all origins (development mode with warning).
    #[serde(default = "d_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: defaults::host().into(),
            port: defaults::port(),
            static_dir: defaults::static_dir().into(),
            html_dir: defaults::html_dir().into(),
            allowed_origins: defaults::allowed_origins().to_vec(),
        }
    }
}

/// Lobby and session timing configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LobbyConfig {
    #[serde(default = "d_default_players")]
    pub default_players: usize,
    #[serde(default = "d_max_players")]
    pub max_players: usize,
    #[serde(default = "d_keepalive_interval")]
    pub keepalive_interval_secs: u64,
    #[serde(default = "d_lobby_timeout")]
    pub lobby_timeout_secs: u64,
    #[serde(default = "d_play_again_timeout")]
    pub play_again_timeout_secs: u64,
    #[serde(default = "d_game_id_length")]
    pub game_id_length: usize,
    #[serde(default = "d_create_on_join")]
    pub create_on_join: bool,
    #[serde(default = "d_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            default_players: defaults::default_players(),
            max_players: defaults::max_players(),
            keepalive_interval_secs: defaults::keepalive_interval_secs(),
            lobby_timeout_secs: defaults::lobby_timeout_secs(),
            play_again_timeout_secs: defaults::play_again_timeout_secs(),
            game_id_length: defaults::game_id_length(),
            create_on_join: defaults::create_on_join(),
            outbound_buffer: defaults::outbound_buffer(),
        }
    }
}

impl LobbyConfig {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn lobby_timeout(&self) -> Duration {
        Duration::from_secs(self.lobby_timeout_secs)
    }

    pub fn play_again_timeout(&self) -> Duration {
        Duration::from_secs(self.play_again_timeout_secs)
    }
}
