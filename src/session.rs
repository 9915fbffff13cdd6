//! Communication session management
//!
//! This module defines how the engine pushes messages to connected players.
//! A [`Tunnel`] is one live connection; a [`Notifier`] finds the tunnel for a
//! player and delivers to it. Delivery is fire-and-forget: a player without
//! a live connection simply misses the message.

use crate::{UpdateMessage, ids::PlayerId};

/// Trait for sending messages through a communication tunnel
///
/// Implementations might wrap a WebSocket sink or a channel sender. Sending
/// must not block the caller and has no observable result.
pub trait Tunnel {
    /// Sends an update message to the client
    fn send_message(&self, message: &UpdateMessage);
}

/// A send capability keyed by player identity
pub trait Notifier {
    /// Delivers `message` to the player's live connection, if any
    fn send(&self, player_id: &PlayerId, message: &UpdateMessage);
}

/// Any tunnel finder is a notifier: look the tunnel up, then send through it
impl<T, F> Notifier for F
where
    T: Tunnel,
    F: Fn(&PlayerId) -> Option<T>,
{
    fn send(&self, player_id: &PlayerId, message: &UpdateMessage) {
        match self(player_id) {
            Some(tunnel) => tunnel.send_message(message),
            None => tracing::trace!(%player_id, "dropping message for disconnected player"),
        }
    }
}

/// Messages queued while the registry is locked, delivered once it is released
#[derive(Debug, Default)]
#[must_use]
pub(crate) struct Outbox {
    messages: Vec<(PlayerId, UpdateMessage)>,
}

impl Outbox {
    /// Queues a message for a single player
    pub(crate) fn push(&mut self, player_id: PlayerId, message: impl Into<UpdateMessage>) {
        self.messages.push((player_id, message.into()));
    }

    /// Hands every queued message to the notifier, in queue order
    pub(crate) fn deliver<N: Notifier + ?Sized>(self, notifier: &N) {
        for (player_id, message) in self.messages {
            notifier.send(&player_id, &message);
        }
    }
}
