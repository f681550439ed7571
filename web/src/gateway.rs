//! WebSocket pumps between a client socket and its lobby connection.
//!
//! Each socket gets a writer task draining the session's outbound queue and a
//! reader task forwarding text frames. The socket lives until the session
//! closes the connection or the client goes away.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use lobby::{pair, ConnectionPeer, Player};
use tracing::{debug, info, warn};

use crate::types::JoinRequest;
use crate::AppState;

pub async fn serve(socket: WebSocket, state: Arc<AppState>, request: JoinRequest) {
    let settings = state.registry.settings();
    let (connection, peer) = pair(settings.outbound_buffer);
    let ConnectionPeer {
        inbound,
        mut outbound,
    } = peer;
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(info) = outbound.recv().await {
            let text = match serde_json::to_string(&info) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to encode message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if inbound.send(text).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    info!(game_id = %request.game_id, player = %request.name, "Client connected");
    let player = Player::new(request.name.clone(), connection);
    let joined = if settings.create_on_join {
        let players = settings.player_count(request.players.as_deref());
        state
            .registry
            .join_or_create(&request.game_id, players, player)
            .await
    } else {
        state.registry.join(&request.game_id, player).await
    };
    if let Err(e) = joined {
        info!(game_id = %request.game_id, player = %request.name, "Join rejected: {}", e);
    }

    // The writer ends once the session drops the connection
    let _ = writer.await;
    reader.abort();
    debug!(game_id = %request.game_id, player = %request.name, "Client disconnected");
}
