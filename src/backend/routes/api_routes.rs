/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 * - `GET /api/auth/me` - Current user
 * - `PUT /api/auth/me/avatar` - Change avatar
 *
 * ## Conversations
 * - `GET|POST /api/conversations`
 * - `DELETE /api/conversations/{conversation_id}`
 * - `GET|POST /api/conversations/{conversation_id}/messages`
 * - `PUT|DELETE /api/messages/{message_id}`
 *
 * ## Groups
 * - `GET|POST /api/groups`
 * - `PUT /api/groups/{group_id}`
 * - `GET|POST /api/groups/{group_id}/messages`
 * - `GET|POST /api/groups/{group_id}/members`
 * - `POST /api/groups/{group_id}/leave`
 * - `PUT|DELETE /api/group-messages/{message_id}`
 *
 * Everything except signup and login requires `Authorization: Bearer`.
 */

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::{get_me, login, signup, update_avatar};
use crate::backend::groups::handlers as groups;
use crate::backend::messaging::handlers as messaging;
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Authentication endpoints
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/me/avatar", put(update_avatar))
        // Conversations
        .route(
            "/api/conversations",
            get(messaging::get_conversations).post(messaging::create_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}",
            axum::routing::delete(messaging::delete_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(messaging::get_messages).post(messaging::send_message),
        )
        .route(
            "/api/messages/{message_id}",
            put(messaging::edit_message).delete(messaging::delete_message),
        )
        // Groups
        .route("/api/groups", get(groups::get_groups).post(groups::create_group))
        .route("/api/groups/{group_id}", put(groups::update_group))
        .route(
            "/api/groups/{group_id}/messages",
            get(groups::get_group_messages).post(groups::send_group_message),
        )
        .route(
            "/api/groups/{group_id}/members",
            get(groups::get_group_members).post(groups::add_group_member),
        )
        .route("/api/groups/{group_id}/leave", post(groups::leave_group))
        .route(
            "/api/group-messages/{message_id}",
            put(groups::edit_group_message).delete(groups::delete_group_message),
        )
}
