//! Error types for joining lobbies, delivering messages and reading moves.

use thiserror::Error;

/// Wire message sent when a join names an unknown game id.
pub const LOBBY_NOT_FOUND: &str = "Lobby does not exist.";
/// Wire message sent when a join reaches a lobby that no longer takes players.
pub const LOBBY_FULL: &str = "Lobby is full.";

/// Why a player could not be seated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("lobby {0} does not exist")]
    NotFound(String),

    #[error("lobby {0} is full")]
    Full(String),
}

impl JoinError {
    /// Message carried by the rejection envelope.
    pub fn wire_message(&self) -> &'static str {
        match self {
            JoinError::NotFound(_) => LOBBY_NOT_FOUND,
            JoinError::Full(_) => LOBBY_FULL,
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            JoinError::NotFound(game_id) | JoinError::Full(game_id) => game_id,
        }
    }
}

/// Failure to hand a message to a player's connection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("outbound queue is full")]
    Full,

    #[error("connection closed")]
    Closed,

    #[error("player has no connection")]
    Detached,
}

/// A move message the session cannot apply.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message carries no placement")]
    MissingPlacement,

    #[error("placement {0} is off the board")]
    OffBoard(i64),

    #[error("illegal move at column {column}, row {row}")]
    Illegal { column: usize, row: usize },
}
