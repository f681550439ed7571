//! Dropline Web Server
//!
//! Serves the Connect 4 pages and hosts live games over WebSockets.
//! Endpoints:
//! - GET  /ws?gameid=&name=[&players=]  - Join a lobby (WebSocket upgrade)
//! - GET  /new[?players=]               - Open a lobby and redirect to its page
//! - GET  /                             - Home page
//! - GET  /:game_id                     - Game page
//! - GET  /static/*                     - Static assets
//! - GET  /health                       - Health check
//! - GET  /metrics                      - Prometheus metrics

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use clap::Parser;
use engine_config::load_config;
use lobby::Registry;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod config;
mod gateway;
mod handlers;
mod types;

use config::Args;
use handlers::{create_lobby, health, join_lobby, metrics_handler};

/// Shared application state
pub struct AppState {
    /// Live lobbies by game id
    pub registry: Registry,
    /// Directory holding home.html and game.html
    pub html_dir: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        warn!("No allowed_origins configured, accepting requests from any origin");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Create the application router with the given state.
/// This is separated out for testing purposes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.allowed_origins);
    let home = ServeFile::new(state.html_dir.join("home.html"));
    let game = ServeFile::new(state.html_dir.join("game.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/new", get(create_lobby))
        .route("/ws", get(join_lobby))
        .route_service("/", home)
        .route_service("/:game_id", game)
        .nest_service("/static", assets)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Creates a future that completes when a shutdown signal is received.
/// Handles Ctrl+C on all platforms.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration from config.toml with env var overrides
    let mut config = load_config();
    args.apply(&mut config);

    init_tracing(&config.common.log_level);
    info!(
        "Configuration: max_players={}, lobby_timeout={}s, create_on_join={}",
        config.lobby.max_players, config.lobby.lobby_timeout_secs, config.lobby.create_on_join
    );

    let state = Arc::new(AppState {
        registry: Registry::from_config(&config.lobby),
        html_dir: PathBuf::from(&config.web.html_dir),
        static_dir: PathBuf::from(&config.web.static_dir),
        allowed_origins: config.web.allowed_origins.clone(),
    });

    // Build router
    let app = create_app(state);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthResponse;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use lobby::LobbySettings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    static TEST_DIRS: AtomicUsize = AtomicUsize::new(0);

    /// Application state backed by a scratch directory holding the pages.
    fn create_test_state() -> Arc<AppState> {
        let root = std::env::temp_dir().join(format!(
            "dropline-web-{}-{}",
            std::process::id(),
            TEST_DIRS.fetch_add(1, Ordering::Relaxed)
        ));
        let html_dir = root.join("html");
        let static_dir = root.join("static");
        std::fs::create_dir_all(&html_dir).unwrap();
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(html_dir.join("home.html"), "<h1>home</h1>").unwrap();
        std::fs::write(html_dir.join("game.html"), "<h1>game</h1>").unwrap();
        std::fs::write(static_dir.join("c4.js"), "// client").unwrap();

        Arc::new(AppState {
            registry: Registry::new(LobbySettings::default()),
            html_dir,
            static_dir,
            allowed_origins: Vec::new(),
        })
    }

    /// Helper to make a GET request and return status, headers and body
    async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        (status, headers, body_str)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state();
        let app = create_app(state);

        let (status, _, body) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let response: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.lobbies, 0);
    }

    #[tokio::test]
    async fn test_new_redirects_to_game_page() {
        let state = create_test_state();

        let (status, headers, _) = get(create_app(state.clone()), "/new?players=3").await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        let location = headers
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let game_id = location.trim_start_matches('/');
        assert_eq!(game_id.len(), 8);
        assert!(state.registry.contains(game_id));

        let (_, _, body) = get(create_app(state), "/health").await;
        let response: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(response.lobbies, 1);
    }

    #[tokio::test]
    async fn test_new_with_garbled_players_still_creates() {
        let state = create_test_state();

        let (status, _, _) = get(create_app(state.clone()), "/new?players=many").await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(state.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_ws_requires_gameid_and_name() {
        let state = create_test_state();

        let (status, _, _) = get(create_app(state.clone()), "/ws?name=bob").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = get(create_app(state.clone()), "/ws?gameid=abc123&name=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) = get(create_app(state), "/ws").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("gameid"));
    }

    #[tokio::test]
    async fn test_ws_without_upgrade_is_426() {
        let state = create_test_state();
        let app = create_app(state);

        let (status, _, _) = get(app, "/ws?gameid=abc123&name=bob").await;

        assert_eq!(status, StatusCode::UPGRADE_REQUIRED);
    }

    #[tokio::test]
    async fn test_pages_are_served() {
        let state = create_test_state();

        let (status, _, body) = get(create_app(state.clone()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>home</h1>");

        let (status, _, body) = get(create_app(state.clone()), "/abcd1234").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>game</h1>");

        let (status, _, body) = get(create_app(state), "/static/c4.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "// client");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = create_test_state();
        state.registry.create(2);
        let app = create_app(state);

        let (status, headers, body) = get(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert!(body.contains("dropline_lobbies_created_total"));
    }
}
