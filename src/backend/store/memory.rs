//! In-memory implementation of the audience reads
//!
//! Holds users, conversations and group memberships in plain maps. The
//! server falls back to an empty instance when no database is configured,
//! which makes every audience resolve empty. Tests seed it directly.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{ChatStore, StoreError};
use crate::shared::messaging::{ConversationId, GroupId, UserId};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, String>,
    conversations: HashMap<ConversationId, (UserId, UserId)>,
    group_members: HashMap<GroupId, BTreeSet<UserId>>,
}

/// Cloneable handle to a shared set of in-memory tables
#[derive(Clone, Default)]
pub struct MemoryChatStore {
    tables: Arc<RwLock<Tables>>,
    failing: Arc<AtomicBool>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: UserId, username: impl Into<String>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.users.insert(user_id, username.into());
        }
    }

    pub fn add_conversation(&self, conversation_id: ConversationId, a: UserId, b: UserId) {
        if let Ok(mut tables) = self.tables.write() {
            tables.conversations.insert(conversation_id, (a, b));
        }
    }

    pub fn remove_conversation(&self, conversation_id: ConversationId) {
        if let Ok(mut tables) = self.tables.write() {
            tables.conversations.remove(&conversation_id);
        }
    }

    pub fn add_group_member(&self, group_id: GroupId, user_id: UserId) {
        if let Ok(mut tables) = self.tables.write() {
            tables.group_members.entry(group_id).or_default().insert(user_id);
        }
    }

    pub fn remove_group_member(&self, group_id: GroupId, user_id: UserId) {
        if let Ok(mut tables) = self.tables.write() {
            if let Some(members) = tables.group_members.get_mut(&group_id) {
                members.remove(&user_id);
            }
        }
    }

    /// Make every read fail with `StoreError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let tables = self.tables.read().map_err(|_| StoreError::Unavailable)?;
        Ok(f(&tables))
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn username(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        self.read(|t| t.users.get(&user_id).cloned())
    }

    async fn conversation_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<(UserId, UserId)>, StoreError> {
        self.read(|t| t.conversations.get(&conversation_id).copied())
    }

    async fn group_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, StoreError> {
        self.read(|t| {
            t.group_members
                .get(&group_id)
                .map(|members| members.iter().copied().collect())
                .unwrap_or_default()
        })
    }
}
