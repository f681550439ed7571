//! JSON messages exchanged with clients.
//!
//! The server only ever sends one envelope shape, [`Info`]. Clients only ever
//! send [`ClientMessage`], carrying a placement during play and a
//! `playAgain` answer once a game is over.

use games_connect4::{Board, COLS, ROWS};
use serde::{Deserialize, Serialize};

use crate::error::MoveError;

/// Public view of a seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
}

/// Board and session state as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// `grid[row][column]`, row 0 at the top; `-1` for empty cells
    pub grid: [[i32; COLS]; ROWS],
    pub turn: u64,
    pub players: Vec<PlayerSummary>,
    pub game_id: String,
    pub is_over: bool,
}

impl GameSnapshot {
    /// Snapshot of an empty board with nobody seated.
    pub fn empty(game_id: &str) -> Self {
        Self {
            grid: Board::new().grid(),
            turn: 0,
            players: Vec::new(),
            game_id: game_id.to_string(),
            is_over: false,
        }
    }
}

/// The server to client envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub game: GameSnapshot,
    pub message: String,
    pub player_turn: bool,
    /// Seat of the recipient, or `-1` when the recipient holds no seat
    pub player_index: i64,
}

impl Info {
    /// Envelope telling a client it was not seated. The connection is closed
    /// right after it is delivered.
    pub fn rejection(game_id: &str, message: impl Into<String>) -> Self {
        let mut game = GameSnapshot::empty(game_id);
        game.is_over = true;
        Self {
            game,
            message: message.into(),
            player_turn: false,
            player_index: -1,
        }
    }
}

/// The client to server message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    #[serde(default)]
    pub placement: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_again: Option<bool>,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, MoveError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode the placement into board coordinates without checking the
    /// board itself.
    pub fn coordinates(&self) -> Result<(usize, usize), MoveError> {
        let placement = self.placement.ok_or(MoveError::MissingPlacement)?;
        Board::decode_placement(placement).ok_or(MoveError::OffBoard(placement))
    }
}
