/**
 * Connection Registry
 *
 * Process-wide map from user id to that user's single live connection.
 *
 * # Invariants
 *
 * - At most one entry per user. Registering a second connection for the
 *   same user replaces the first; the displaced handle is not closed and
 *   simply stops receiving pushes.
 * - Removal is keyed on the connection id as well as the user id, so a late
 *   close from a replaced connection cannot remove its successor's entry.
 *
 * All operations are single atomic map operations. There is no
 * read-modify-write across calls.
 */

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::messaging::UserId;

/// Identity of one physical connection, distinct per reconnect
pub type ConnectionId = Uuid;

/// Error returned when pushing to a connection whose writer has gone away
#[derive(Debug, Error, PartialEq, Eq)]
#[error("connection {0} is closed")]
pub struct ConnectionClosed(pub ConnectionId);

/// Sending half of one client connection
///
/// Frames pushed here are forwarded to the socket by the connection's
/// writer task. Cloning is cheap; every clone targets the same socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: UserId,
    tx: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Create a handle for `user_id` and the receiver its writer drains
    pub fn new(user_id: UserId) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Self {
            id: Uuid::new_v4(),
            user_id,
            tx,
        };
        (handle, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// False once the writer side has been dropped
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a text frame for the socket
    pub fn send(&self, frame: String) -> Result<(), ConnectionClosed> {
        self.tx.send(frame).map_err(|_| ConnectionClosed(self.id))
    }

    /// Whether both handles refer to the same physical connection
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        self.id == other.id
    }
}

/// Shared user → connection map
///
/// Constructed once at startup and passed to the dispatcher and the
/// sessions. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    entries: Arc<DashMap<UserId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` the live connection of its user
    ///
    /// Returns the handle it displaced, if any.
    pub fn register(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let user_id = handle.user_id;
        let connection_id = handle.id;
        let displaced = self.entries.insert(user_id, handle);

        match &displaced {
            Some(old) => tracing::info!(
                user_id = %user_id,
                connection_id = %connection_id,
                displaced = %old.id,
                "Connection replaced"
            ),
            None => tracing::debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                "Connection registered"
            ),
        }

        displaced
    }

    /// Current connection of `user_id`
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionHandle> {
        self.entries.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Remove the entry of `user_id` only if it still belongs to `connection_id`
    ///
    /// Returns true if an entry was removed. A no-op when the user has no
    /// entry or when a newer connection has replaced this one.
    pub fn unregister(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let removed = self
            .entries
            .remove_if(&user_id, |_, current| current.id == connection_id)
            .is_some();

        if removed {
            tracing::debug!(user_id = %user_id, connection_id = %connection_id, "Connection unregistered");
        } else {
            tracing::debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                "Stale unregister ignored"
            );
        }

        removed
    }

    pub fn is_connected(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Number of users with a registered connection
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
