//! Prometheus metrics for lobbies and game sessions.
//!
//! Metrics are process-wide and registered once; the web crate exposes them
//! at `/metrics` through [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Once;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ========== Lobby Metrics ==========

    /// Session generations created (fresh lobbies and play-again recycles)
    pub static ref LOBBIES_CREATED: IntCounter = IntCounter::with_opts(
        Opts::new("dropline_lobbies_created_total", "Total session generations created")
    ).unwrap();

    /// Session tasks currently running
    pub static ref SESSIONS_ACTIVE: IntGauge = IntGauge::with_opts(
        Opts::new("dropline_sessions_active", "Session tasks currently running")
    ).unwrap();

    /// Players seated in a lobby
    pub static ref PLAYERS_JOINED: IntCounter = IntCounter::with_opts(
        Opts::new("dropline_players_joined_total", "Total players seated in a lobby")
    ).unwrap();

    /// Joins answered with a rejection envelope
    pub static ref JOIN_REJECTIONS: IntCounter = IntCounter::with_opts(
        Opts::new("dropline_join_rejections_total", "Joins rejected as unknown or full")
    ).unwrap();

    /// Lobbies closed by the lobby timeout
    pub static ref LOBBIES_EXPIRED: IntCounter = IntCounter::with_opts(
        Opts::new("dropline_lobbies_expired_total", "Lobbies closed before filling up")
    ).unwrap();

    // ========== Game Metrics ==========

    /// Accepted moves across all games
    pub static ref MOVES_PLAYED: IntCounter = IntCounter::with_opts(
        Opts::new("dropline_moves_played_total", "Total moves played across all games")
    ).unwrap();

    /// Finished games by outcome (won, drawn, forfeited)
    pub static ref GAMES_COMPLETED: IntCounterVec = IntCounterVec::new(
        Opts::new("dropline_games_completed_total", "Total games completed"),
        &["outcome"]
    ).unwrap();
}

static INIT: Once = Once::new();

/// Initialize and register all metrics with the registry.
/// Safe to call multiple times - only initializes once.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(LOBBIES_CREATED.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(SESSIONS_ACTIVE.clone()))
            .unwrap();
        REGISTRY.register(Box::new(PLAYERS_JOINED.clone())).unwrap();
        REGISTRY
            .register(Box::new(JOIN_REJECTIONS.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(LOBBIES_EXPIRED.clone()))
            .unwrap();
        REGISTRY.register(Box::new(MOVES_PLAYED.clone())).unwrap();
        REGISTRY
            .register(Box::new(GAMES_COMPLETED.clone()))
            .unwrap();
    });
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
