//! Channel-backed player connections.
//!
//! A session never touches a socket. It owns a [`PlayerConnection`]: a bounded
//! queue of outgoing [`Info`] envelopes and a stream of incoming text frames.
//! The transport side holds the matching [`ConnectionPeer`] and pumps frames
//! between the two. Dropping the `PlayerConnection` closes the connection.

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use crate::error::TransportError;
use crate::protocol::Info;

/// Session side of a client connection.
#[derive(Debug)]
pub struct PlayerConnection {
    outbound: mpsc::Sender<Info>,
    inbound: mpsc::Receiver<String>,
}

/// Transport side of a client connection.
#[derive(Debug)]
pub struct ConnectionPeer {
    /// Text frames received from the client
    pub inbound: mpsc::Sender<String>,
    /// Envelopes to write to the client; yields `None` once the session
    /// closed the connection
    pub outbound: mpsc::Receiver<Info>,
}

/// Create a connected pair. `buffer` bounds both directions.
pub fn pair(buffer: usize) -> (PlayerConnection, ConnectionPeer) {
    let buffer = buffer.max(1);
    let (out_tx, out_rx) = mpsc::channel(buffer);
    let (in_tx, in_rx) = mpsc::channel(buffer);
    (
        PlayerConnection {
            outbound: out_tx,
            inbound: in_rx,
        },
        ConnectionPeer {
            inbound: in_tx,
            outbound: out_rx,
        },
    )
}

impl PlayerConnection {
    /// Queue an envelope without waiting. A slow consumer is treated the same
    /// as a gone one.
    pub fn send(&self, info: Info) -> Result<(), TransportError> {
        self.outbound.try_send(info).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Next text frame from the client, `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Discard frames that arrived while it was not this player's turn.
    pub fn drain(&mut self) -> usize {
        let mut discarded = 0;
        loop {
            match self.inbound.try_recv() {
                Ok(_) => discarded += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        discarded
    }
}

impl ConnectionPeer {
    /// Deliver a text frame as if the client had sent it.
    pub async fn send_text(&self, text: impl Into<String>) -> bool {
        self.inbound.send(text.into()).await.is_ok()
    }

    /// Next envelope from the session.
    pub async fn next_info(&mut self) -> Option<Info> {
        self.outbound.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_pair() {
        let (mut conn, mut peer) = pair(4);

        conn.send(Info::rejection("g", "hello")).unwrap();
        assert_eq!(peer.next_info().await.unwrap().message, "hello");

        assert!(peer.send_text("{}").await);
        assert_eq!(conn.recv().await.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_full_queue_is_a_send_failure() {
        let (conn, _peer) = pair(1);
        conn.send(Info::rejection("g", "one")).unwrap();
        assert_eq!(
            conn.send(Info::rejection("g", "two")),
            Err(TransportError::Full)
        );
    }

    #[tokio::test]
    async fn test_dropped_peer_is_closed() {
        let (mut conn, peer) = pair(4);
        drop(peer);
        assert_eq!(
            conn.send(Info::rejection("g", "gone")),
            Err(TransportError::Closed)
        );
        assert_eq!(conn.recv().await, None);
    }

    #[tokio::test]
    async fn test_drain_discards_buffered_frames() {
        let (mut conn, peer) = pair(8);
        peer.send_text("a").await;
        peer.send_text("b").await;

        assert_eq!(conn.drain(), 2);
        peer.send_text("c").await;
        assert_eq!(conn.recv().await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_dropping_connection_ends_peer_stream() {
        let (conn, mut peer) = pair(4);
        drop(conn);
        assert!(peer.next_info().await.is_none());
        assert!(!peer.send_text("late").await);
    }
}
