//! Request types for the web API.

use serde::Deserialize;

/// Query string of `GET /ws`.
///
/// Every field is optional at the extractor level so that a missing
/// parameter is answered with our own `400` rather than a rejection body.
#[derive(Debug, Default, Deserialize)]
pub struct JoinParams {
    #[serde(default)]
    pub gameid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Lobby size, only consulted when joining may create the lobby
    #[serde(default)]
    pub players: Option<String>,
}

/// A validated join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub game_id: String,
    pub name: String,
    pub players: Option<String>,
}

impl JoinParams {
    pub fn into_request(self) -> Result<JoinRequest, &'static str> {
        let game_id = non_empty(self.gameid).ok_or("missing gameid")?;
        let name = non_empty(self.name).ok_or("missing name")?;
        Ok(JoinRequest {
            game_id,
            name,
            players: self.players,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Query string of `GET /new`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    pub players: Option<String>,
}
