//! Group Chat HTTP Handlers
//!
//! Every endpoint except creation requires the caller to be a current
//! member. Mutations notify the group's members after they commit; the
//! audience is read at delivery time, so a member who just left does not
//! receive `member_left` and a member who was just added does receive
//! `member_added`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sqlx::PgPool;

use super::db;
use crate::backend::auth::users::get_user_by_username;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::Audience;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{
    validate_message_text, AddMemberRequest, CreateGroupRequest, CreateGroupResponse,
    EditMessageRequest, GroupId, GroupMember, GroupSummary, MessageId, MessageRecord,
    MessagesQuery, SendMessageRequest, SendMessageResponse, SuccessResponse, UpdateGroupRequest,
    UserId,
};
use crate::shared::{ChatEvent, SharedError};

/// `404` for an unknown group, `403` for a non-member
async fn require_member(pool: &PgPool, group_id: GroupId, user_id: UserId) -> Result<(), BackendError> {
    if db::is_member(pool, group_id, user_id).await? {
        return Ok(());
    }
    if !db::group_exists(pool, group_id).await? {
        return Err(BackendError::not_found("Group not found"));
    }
    tracing::warn!(user_id = %user_id, group_id = %group_id, "Not a group member");
    Err(BackendError::forbidden("Not a member of this group"))
}

async fn require_own_group_message(
    pool: &PgPool,
    message_id: MessageId,
    user_id: UserId,
) -> Result<db::GroupMessageMeta, BackendError> {
    let meta = db::get_group_message_meta(pool, message_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    if meta.sender_id != user_id {
        return Err(BackendError::forbidden("Not the sender of this message"));
    }
    if meta.deleted {
        return Err(BackendError::bad_request("Message has been deleted"));
    }

    Ok(meta)
}

/// Create a group
pub async fn create_group(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<Json<CreateGroupResponse>, BackendError> {
    let pool = app_state.db()?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(SharedError::validation("name", "Group name required").into());
    }
    let description = request.description.as_deref().unwrap_or("").trim();

    let group_id = db::create_group(pool, name, description, user.user_id, &request.members).await?;
    tracing::info!(group_id = %group_id, created_by = %user.user_id, "Group created: {}", name);

    Ok(Json(CreateGroupResponse { success: true, group_id }))
}

/// Groups of the current user
pub async fn get_groups(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<GroupSummary>>, BackendError> {
    let pool = app_state.db()?;
    Ok(Json(db::get_groups_for_user(pool, user.user_id).await?))
}

pub async fn get_group_messages(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageRecord>>, BackendError> {
    let pool = app_state.db()?;
    require_member(pool, group_id, user.user_id).await?;

    let limit = params.page_size(app_state.config.message_page_limit);
    Ok(Json(db::get_group_messages(pool, group_id, limit).await?))
}

pub async fn send_group_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, BackendError> {
    let pool = app_state.db()?;
    validate_message_text(&request.message)?;
    require_member(pool, group_id, user.user_id).await?;

    if let Some(reply_to) = request.reply_to_message_id {
        let target = db::get_group_message_meta(pool, reply_to).await?;
        if target.map(|m| m.group_id) != Some(group_id) {
            return Err(BackendError::bad_request("Reply target not found in this group"));
        }
    }

    let id = db::insert_group_message(
        pool,
        group_id,
        user.user_id,
        &request.message,
        request.reply_to_message_id,
    )
    .await?;

    app_state
        .notifier
        .announce(Audience::Group(group_id), ChatEvent::NewGroupMessage { group_id });

    Ok(Json(SendMessageResponse { success: true, id }))
}

pub async fn edit_group_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<MessageId>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    validate_message_text(&request.message)?;
    let meta = require_own_group_message(pool, message_id, user.user_id).await?;

    db::edit_group_message(pool, message_id, &request.message).await?;

    app_state.notifier.announce(
        Audience::Group(meta.group_id),
        ChatEvent::GroupMessageEdited {
            group_id: meta.group_id,
            message_id,
        },
    );

    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_group_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<MessageId>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    let meta = require_own_group_message(pool, message_id, user.user_id).await?;

    db::soft_delete_group_message(pool, message_id).await?;

    app_state.notifier.announce(
        Audience::Group(meta.group_id),
        ChatEvent::GroupMessageDeleted {
            group_id: meta.group_id,
            message_id,
        },
    );

    Ok(Json(SuccessResponse::ok()))
}

/// Rename a group or change its description
pub async fn update_group(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    require_member(pool, group_id, user.user_id).await?;

    if request.is_empty() {
        return Err(BackendError::bad_request("Nothing to update"));
    }

    let name = request.name().map(str::trim);
    let description = request.description.as_deref().map(str::trim);
    db::update_group(pool, group_id, name, description).await?;

    app_state
        .notifier
        .announce(Audience::Group(group_id), ChatEvent::GroupUpdated { group_id });

    Ok(Json(SuccessResponse::ok()))
}

pub async fn get_group_members(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<GroupMember>>, BackendError> {
    let pool = app_state.db()?;
    require_member(pool, group_id, user.user_id).await?;
    Ok(Json(db::get_group_members(pool, group_id).await?))
}

/// Add a user to a group by username
pub async fn add_group_member(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    require_member(pool, group_id, user.user_id).await?;

    let new_member = get_user_by_username(pool, request.username.trim())
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    if !db::add_group_member(pool, group_id, new_member.id).await? {
        return Err(BackendError::conflict("User is already a member"));
    }

    tracing::info!(group_id = %group_id, user_id = %new_member.id, "Member added");

    app_state
        .notifier
        .announce(Audience::Group(group_id), ChatEvent::MemberAdded { group_id });

    Ok(Json(SuccessResponse::ok()))
}

/// Leave a group; the last member to leave deletes it
pub async fn leave_group(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    require_member(pool, group_id, user.user_id).await?;

    let outcome = db::leave_group(pool, group_id, user.user_id).await?;
    if !outcome.removed {
        return Err(BackendError::forbidden("Not a member of this group"));
    }

    if outcome.group_deleted {
        tracing::info!(group_id = %group_id, "Last member left, group deleted");
    } else {
        tracing::info!(group_id = %group_id, user_id = %user.user_id, "Member left");
    }

    app_state
        .notifier
        .announce(Audience::Group(group_id), ChatEvent::MemberLeft { group_id });

    Ok(Json(SuccessResponse::ok()))
}
