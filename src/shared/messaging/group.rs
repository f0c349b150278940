//! Group Chat Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};

/// A group chat as listed for one of its members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One row of a group's member list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct GroupMember {
    /// Member's user ID
    pub id: UserId,
    pub username: String,
    pub pfp_url: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Usernames to add besides the creator; unknown names are skipped
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateGroupResponse {
    pub success: bool,
    pub group_id: GroupId,
}

/// Partial update of a group's name and description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    /// Blank names count as absent
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.description.is_none()
    }
}

/// Request to add a user to a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub username: String,
}
