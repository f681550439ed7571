//! Tests for the configuration module.

use super::*;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.web.host, "0.0.0.0");
    assert_eq!(config.web.port, 8292);
    assert_eq!(config.web.static_dir, "./static");
    assert_eq!(config.web.html_dir, "./html");
    assert_eq!(config.lobby.default_players, 2);
    assert_eq!(config.lobby.max_players, 6);
}

#[test]
fn test_lobby_durations() {
    let config = CentralConfig::default();
    assert_eq!(config.lobby.keepalive_interval(), Duration::from_secs(30));
    assert_eq!(config.lobby.lobby_timeout(), Duration::from_secs(600));
    assert_eq!(config.lobby.play_again_timeout(), Duration::from_secs(60));
}

#[test]
fn test_env_overrides() {
    // Each test touches its own variables; tests run in parallel
    std::env::set_var("DROPLINE_LOBBY_MAX_PLAYERS", "4");
    std::env::set_var("DROPLINE_LOBBY_CREATE_ON_JOIN", "true");
    std::env::set_var("DROPLINE_WEB_ALLOWED_ORIGINS", "https://a.example, https://b.example,");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.lobby.max_players, 4);
    assert!(config.lobby.create_on_join);
    assert_eq!(
        config.web.allowed_origins,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );

    std::env::remove_var("DROPLINE_LOBBY_MAX_PLAYERS");
    std::env::remove_var("DROPLINE_LOBBY_CREATE_ON_JOIN");
    std::env::remove_var("DROPLINE_WEB_ALLOWED_ORIGINS");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    std::env::set_var("DROPLINE_LOBBY_GAME_ID_LENGTH", "eight");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.lobby.game_id_length, 8);

    std::env::remove_var("DROPLINE_LOBBY_GAME_ID_LENGTH");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"

[web]
host = "127.0.0.1"
port = 3000
allowed_origins = ["http://localhost:3000"]

[lobby]
max_players = 4
keepalive_interval_secs = 10
create_on_join = true
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.web.host, "127.0.0.1");
    assert_eq!(config.web.port, 3000);
    assert_eq!(config.web.allowed_origins, vec!["http://localhost:3000"]);
    assert_eq!(config.lobby.max_players, 4);
    assert_eq!(config.lobby.keepalive_interval_secs, 10);
    assert!(config.lobby.create_on_join);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[lobby]
lobby_timeout_secs = 120
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.lobby.lobby_timeout_secs, 120);
    assert_eq!(config.lobby.play_again_timeout_secs, 60); // Default
    assert_eq!(config.common.log_level, "info"); // Default
    assert_eq!(config.web.port, 8292); // Default
}

#[test]
fn test_load_from_missing_path_uses_defaults() {
    let path = std::path::PathBuf::from("/nonexistent/dropline/config.toml");
    let config = load_from_path(&path);
    assert_eq!(config.lobby.default_players, 2);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.web.host, cloned.web.host);
    assert_eq!(config.lobby.max_players, cloned.lobby.max_players);
}
