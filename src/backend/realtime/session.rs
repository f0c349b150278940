/**
 * Client Session
 *
 * Lifecycle of one authenticated WebSocket connection, independent of the
 * socket itself:
 *
 * ```text
 * Connecting --authenticate(Some)--> Active --close()--> Closed
 * Connecting --authenticate(None)--> Closed
 * ```
 *
 * An `Active` session owns the registry entry of its user. Closing (or
 * dropping) the session removes that entry, unless a newer connection of
 * the same user has already replaced it.
 *
 * Inbound frames are typing indicators. They are relayed to the other
 * participant of the conversation; every other frame is ignored.
 */

use tokio::sync::mpsc;

use crate::backend::realtime::broadcast::{Audience, Notifier};
use crate::backend::realtime::registry::ConnectionHandle;
use crate::shared::messaging::{ConversationId, UserId};
use crate::shared::{ChatEvent, ClientFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Relayed; carries the number of connections it reached
    Relayed(usize),
    /// Valid but not acted on
    Ignored,
    /// Not valid JSON or missing required fields
    Malformed,
}

pub struct Session {
    notifier: Notifier,
    handle: Option<ConnectionHandle>,
    state: SessionState,
}

impl Session {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            handle: None,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.handle.as_ref().map(ConnectionHandle::user_id)
    }

    /// Finish the handshake with the identity resolved from the request
    ///
    /// With an identity the session registers its connection and returns the
    /// receiver the socket writer drains. Without one the session closes and
    /// nothing is registered.
    pub fn authenticate(&mut self, identity: Option<UserId>) -> Option<mpsc::UnboundedReceiver<String>> {
        if self.state != SessionState::Connecting {
            return None;
        }

        let Some(user_id) = identity else {
            tracing::info!("Rejecting unauthenticated connection");
            self.state = SessionState::Closed;
            return None;
        };

        let (handle, rx) = ConnectionHandle::new(user_id);
        self.notifier.registry().register(handle.clone());
        tracing::info!(user_id = %user_id, connection_id = %handle.id(), "Session active");

        self.handle = Some(handle);
        self.state = SessionState::Active;
        Some(rx)
    }

    /// Handle one inbound text frame
    pub async fn handle_frame(&self, text: &str) -> FrameOutcome {
        let Some(user_id) = self.active_user() else {
            return FrameOutcome::Ignored;
        };

        match ClientFrame::parse(text) {
            Ok(ClientFrame::Typing { conversation_id }) => {
                self.relay_typing(user_id, conversation_id).await
            }
            Ok(ClientFrame::StoppedTyping { conversation_id }) => {
                let event = ChatEvent::UserStoppedTyping { conversation_id, user_id };
                self.relay(conversation_id, user_id, &event).await
            }
            Ok(ClientFrame::Unknown) => {
                tracing::debug!(user_id = %user_id, "Ignoring frame of unknown type");
                FrameOutcome::Ignored
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Discarding malformed frame");
                FrameOutcome::Malformed
            }
        }
    }

    async fn relay_typing(&self, user_id: UserId, conversation_id: ConversationId) -> FrameOutcome {
        let username = match self.notifier.store().username(user_id).await {
            Ok(Some(username)) => username,
            Ok(None) => {
                tracing::debug!(user_id = %user_id, "Typing from unknown user ignored");
                return FrameOutcome::Ignored;
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to look up username");
                return FrameOutcome::Ignored;
            }
        };

        let event = ChatEvent::UserTyping {
            conversation_id,
            user_id,
            username,
        };
        self.relay(conversation_id, user_id, &event).await
    }

    /// Send to the other participant; `Ignored` when the sender is not one
    async fn relay(&self, conversation_id: ConversationId, user_id: UserId, event: &ChatEvent) -> FrameOutcome {
        match self
            .notifier
            .notify_audience_except(Audience::Conversation(conversation_id), event, user_id)
            .await
        {
            Some(delivered) => FrameOutcome::Relayed(delivered),
            None => FrameOutcome::Ignored,
        }
    }

    /// Move to `Closed`, releasing the registry entry if it is still ours
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(handle) = &self.handle {
            self.notifier.registry().unregister(handle.user_id(), handle.id());
            tracing::info!(user_id = %handle.user_id(), connection_id = %handle.id(), "Session closed");
        }
        self.state = SessionState::Closed;
    }

    fn active_user(&self) -> Option<UserId> {
        match (&self.state, &self.handle) {
            (SessionState::Active, Some(handle)) => Some(handle.user_id()),
            _ => None,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
