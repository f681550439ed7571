//! Lobby creation and the WebSocket join endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::gateway;
use crate::types::{CreateParams, JoinParams};
use crate::AppState;

/// Open a lobby under a fresh game id and send the client to its page.
pub async fn create_lobby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateParams>,
) -> Redirect {
    let players = state
        .registry
        .settings()
        .player_count(params.players.as_deref());
    let handle = state.registry.create(players);
    info!(game_id = %handle.game_id(), players, "Created lobby via /new");
    Redirect::to(&format!("/{}", handle.game_id()))
}

/// Upgrade to a WebSocket and seat the client in the requested lobby.
pub async fn join_lobby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JoinParams>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let request = match params.into_request() {
        Ok(request) => request,
        Err(reason) => {
            debug!("Rejected join request: {}", reason);
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
    };

    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            "Expected a WebSocket upgrade request",
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| gateway::serve(socket, state, request))
}
