//! Response types for the web API.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Game ids currently held by the registry
    pub lobbies: usize,
}
