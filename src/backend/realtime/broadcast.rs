/**
 * Audience Fan-out
 *
 * Delivers one `ChatEvent` to every registered connection of an audience.
 *
 * # Audiences
 *
 * An audience is resolved from durable state at the moment of delivery:
 * the two participants of a conversation, or the current members of a
 * group. A fixed list of users is used when the backing row no longer
 * exists (a deleted conversation).
 *
 * # Delivery
 *
 * - The event is serialized once and the same frame goes to every recipient.
 * - Recipients without a registered connection are skipped; nothing queues.
 * - A failed push to one recipient never affects the others.
 * - Resolution failures and empty audiences are logged and dropped. No
 *   error reaches the caller, whose durable mutation already committed.
 *
 * Mutation handlers use `announce`, which runs the delivery on its own task
 * so it completes even if the request that triggered it is cancelled.
 */

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::backend::realtime::registry::ConnectionRegistry;
use crate::backend::store::{ChatStore, StoreError};
use crate::shared::messaging::{ConversationId, GroupId, UserId};
use crate::shared::ChatEvent;

/// Set of users an event is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Both participants of a direct conversation
    Conversation(ConversationId),
    /// Current members of a group
    Group(GroupId),
    /// A list captured before the backing row was removed
    Users(Vec<UserId>),
}

/// Resolves audiences and pushes events to their live connections
#[derive(Clone)]
pub struct Notifier {
    registry: ConnectionRegistry,
    store: Arc<dyn ChatStore>,
}

impl Notifier {
    pub fn new(registry: ConnectionRegistry, store: Arc<dyn ChatStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.store
    }

    /// Current user ids of an audience, deduplicated
    pub async fn resolve(&self, audience: &Audience) -> Result<Vec<UserId>, StoreError> {
        let mut users = match audience {
            Audience::Conversation(conversation_id) => self
                .store
                .conversation_participants(*conversation_id)
                .await?
                .map(|(a, b)| vec![a, b])
                .unwrap_or_default(),
            Audience::Group(group_id) => self.store.group_member_ids(*group_id).await?,
            Audience::Users(users) => users.clone(),
        };
        users.sort_unstable();
        users.dedup();
        Ok(users)
    }

    /// Deliver `event` to every connected member of `audience`
    ///
    /// Returns the number of connections the frame was queued on.
    pub async fn notify_audience(&self, audience: Audience, event: &ChatEvent) -> usize {
        let Some(recipients) = self.recipients(&audience, event).await else {
            return 0;
        };
        self.push(&recipients, event)
    }

    /// Deliver `event` to `audience` on behalf of `sender`
    ///
    /// The sender must belong to the audience and never receives its own
    /// event. Used for typing indicators.
    ///
    /// Returns `None` when the event was dropped: the audience could not be
    /// resolved or does not include `sender`.
    pub async fn notify_audience_except(
        &self,
        audience: Audience,
        event: &ChatEvent,
        sender: UserId,
    ) -> Option<usize> {
        let recipients = self.recipients(&audience, event).await?;

        if !recipients.contains(&sender) {
            tracing::debug!(
                sender = %sender,
                event = event.event_type(),
                "Sender is not part of the audience, dropping event"
            );
            return None;
        }

        let others: Vec<UserId> = recipients.into_iter().filter(|id| *id != sender).collect();
        Some(self.push(&others, event))
    }

    /// Run `notify_audience` on a detached task
    pub fn announce(&self, audience: Audience, event: ChatEvent) -> JoinHandle<usize> {
        let notifier = self.clone();
        tokio::spawn(async move { notifier.notify_audience(audience, &event).await })
    }

    async fn recipients(&self, audience: &Audience, event: &ChatEvent) -> Option<Vec<UserId>> {
        match self.resolve(audience).await {
            Ok(users) if users.is_empty() => {
                tracing::debug!(
                    audience = ?audience,
                    event = event.event_type(),
                    "Audience is empty, nothing to deliver"
                );
                None
            }
            Ok(users) => Some(users),
            Err(e) => {
                tracing::warn!(
                    audience = ?audience,
                    event = event.event_type(),
                    error = %e,
                    "Failed to resolve audience, event dropped"
                );
                None
            }
        }
    }

    fn push(&self, recipients: &[UserId], event: &ChatEvent) -> usize {
        let frame = match event.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event = event.event_type(), error = %e, "Failed to encode event");
                return 0;
            }
        };

        let mut delivered = 0;
        for user_id in recipients {
            let Some(handle) = self.registry.lookup(*user_id) else {
                continue;
            };
            match handle.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(user_id = %user_id, error = %e, "Skipping closed connection");
                }
            }
        }

        tracing::debug!(
            event = event.event_type(),
            recipients = recipients.len(),
            delivered,
            "Event delivered"
        );
        delivered
    }
}
