//! Dropline game sessions.
//!
//! This crate hosts everything between a connected client and the Connect 4
//! board: lobby formation, turn sequencing, forfeits, keep-alives, the
//! play-again cycle and the [`Registry`] that maps game ids to live sessions.
//!
//! Transports plug in through [`connection::pair`]: the session side
//! ([`PlayerConnection`]) goes into a [`Player`], the transport keeps the
//! [`ConnectionPeer`] and pumps frames.
//!
//! ```rust,no_run
//! use lobby::{pair, Player, Registry};
//!
//! # async fn example() {
//! let registry = Registry::default();
//! let lobby = registry.create(2);
//!
//! let (connection, mut peer) = pair(64);
//! registry
//!     .join(lobby.game_id(), Player::new("alice", connection))
//!     .await
//!     .ok();
//! let waiting = peer.next_info().await;
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod game_id;
pub mod metrics;
pub mod protocol;
pub mod registry;
pub mod session;

pub use connection::{pair, ConnectionPeer, PlayerConnection};
pub use error::{JoinError, MoveError, TransportError, LOBBY_FULL, LOBBY_NOT_FOUND};
pub use game_id::GameIdGenerator;
pub use protocol::{ClientMessage, GameSnapshot, Info, PlayerSummary};
pub use registry::Registry;
pub use session::{LobbySettings, Phase, Player, SessionHandle, MIN_PLAYERS};
