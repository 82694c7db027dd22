use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};
use skillswap_shared::types::auth::AuthUser;

use crate::cache_ops;
use crate::models::{ChatMessage, Connection, NewChatMessage, STATUS_ACCEPTED};
use crate::schema::{chats, connections};
use crate::AppState;

// --- Capability checks ---
//
// Reads and sends gate differently on purpose: sending requires an accepted
// connection, reading only membership. They stay two separate lookups so a
// change to one cannot silently widen the other.

/// Membership lookup used by reads: any participant, any status.
fn participant_connection(
    conn: &mut PgConnection,
    connection_id: Uuid,
    user_id: Uuid,
) -> AppResult<Option<Connection>> {
    Ok(connections::table
        .find(connection_id)
        .filter(
            connections::sender_id
                .eq(user_id)
                .or(connections::receiver_id.eq(user_id)),
        )
        .first::<Connection>(conn)
        .optional()?)
}

/// Gate used by sends: participant AND accepted. A missing row, a
/// non-participant and a non-accepted status all read as the same absence,
/// so callers cannot distinguish them.
fn accepted_connection(
    conn: &mut PgConnection,
    connection_id: Uuid,
    user_id: Uuid,
) -> AppResult<Option<Connection>> {
    Ok(connections::table
        .find(connection_id)
        .filter(connections::status.eq(STATUS_ACCEPTED))
        .filter(
            connections::sender_id
                .eq(user_id)
                .or(connections::receiver_id.eq(user_id)),
        )
        .first::<Connection>(conn)
        .optional()?)
}

/// Accepts only a non-blank JSON string, trimmed.
fn normalized_message(raw: Option<&serde_json::Value>) -> Option<String> {
    raw.and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

// --- GET /chats/:connection_id ---

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(connection_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> AppResult<Json<MessagesResponse>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    participant_connection(&mut conn, connection_id, profile.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "Connection not found"))?;

    // Cache first. The cache holds only recent history, so a hit never
    // offers further pagination.
    if let Some(messages) =
        cache_ops::cached_chat_messages(state.cache.as_ref(), connection_id, query.limit).await
    {
        return Ok(Json(MessagesResponse {
            messages,
            has_more: false,
        }));
    }

    let mut messages: Vec<ChatMessage> = chats::table
        .filter(chats::connection_id.eq(connection_id))
        .order(chats::created_at.desc())
        .limit(query.limit as i64)
        .load(&mut conn)?;

    let has_more = messages.len() == query.limit;
    messages.reverse();

    // Lazy single-entry backfill: only the newest message goes back into
    // the cache; the rest of the window refills through send traffic.
    if let Some(newest) = messages.last() {
        cache_ops::cache_chat_message(state.cache.as_ref(), connection_id, newest).await;
    }

    Ok(Json(MessagesResponse { messages, has_more }))
}

// --- POST /chats/:connection_id ---

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<serde_json::Value>,
}

pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(connection_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    let message = normalized_message(req.message.as_ref())
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "Message is required"))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    accepted_connection(&mut conn, connection_id, profile.id)?.ok_or_else(|| {
        AppError::new(
            ErrorCode::ConnectionNotFound,
            "Connection not found or not accepted",
        )
    })?;

    let new_message = NewChatMessage {
        connection_id,
        sender_id: profile.id,
        message,
    };

    let created: ChatMessage = diesel::insert_into(chats::table)
        .values(&new_message)
        .get_result(&mut conn)?;

    cache_ops::cache_chat_message(state.cache.as_ref(), connection_id, &created).await;

    Ok(Json(created))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_message_accepts_trimmed_strings() {
        let value = serde_json::json!("  hi there  ");
        assert_eq!(normalized_message(Some(&value)), Some("hi there".to_string()));
    }

    #[test]
    fn normalized_message_rejects_blank_and_non_strings() {
        assert_eq!(normalized_message(None), None);
        assert_eq!(normalized_message(Some(&serde_json::json!(""))), None);
        assert_eq!(normalized_message(Some(&serde_json::json!("   "))), None);
        assert_eq!(normalized_message(Some(&serde_json::json!(42))), None);
        assert_eq!(normalized_message(Some(&serde_json::json!(["hi"]))), None);
        assert_eq!(normalized_message(Some(&serde_json::Value::Null)), None);
    }
}
