//! HTTP request handlers.

mod health;
mod lobbies;

pub use health::*;
pub use lobbies::*;
