use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};
use skillswap_shared::types::auth::AuthUser;

use crate::models::{Connection, NewConnection, PublicUser, STATUS_ACCEPTED, STATUS_PENDING, STATUS_REJECTED};
use crate::schema::{connections, users};
use crate::AppState;

// --- POST /connections ---

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub receiver_id: Option<Uuid>,
}

pub async fn create_connection(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateConnectionRequest>,
) -> AppResult<Json<Connection>> {
    let receiver_id = req
        .receiver_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "Receiver ID is required"))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let sender = users::table
        .filter(users::credential_id.eq(user.id))
        .first::<crate::models::User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "Sender profile not found"))?;

    // One row per unordered pair, checked against both orderings and any
    // status. The check and the insert are separate statements, so two
    // concurrent requests can both pass the check (accepted risk, see
    // DESIGN.md).
    let exists: bool = connections::table
        .filter(
            connections::sender_id
                .eq(sender.id)
                .and(connections::receiver_id.eq(receiver_id))
                .or(connections::sender_id
                    .eq(receiver_id)
                    .and(connections::receiver_id.eq(sender.id))),
        )
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if exists {
        return Err(AppError::new(
            ErrorCode::ConnectionExists,
            "Connection already exists",
        ));
    }

    let new_connection = NewConnection {
        sender_id: sender.id,
        receiver_id,
        status: STATUS_PENDING.to_string(),
    };

    let created: Connection = diesel::insert_into(connections::table)
        .values(&new_connection)
        .get_result(&mut conn)?;

    tracing::info!(
        connection_id = %created.id,
        sender = %created.sender_id,
        receiver = %created.receiver_id,
        "connection request created"
    );

    Ok(Json(created))
}

// --- GET /connections ---

#[derive(Debug, Deserialize)]
pub struct ListConnectionsQuery {
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "all".to_string()
}

#[derive(Debug, Serialize)]
pub struct ConnectionWithUser {
    #[serde(flatten)]
    pub connection: Connection,
    pub other_user: Option<PublicUser>,
    pub is_sender: bool,
}

pub async fn list_connections(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListConnectionsQuery>,
) -> AppResult<Json<Vec<ConnectionWithUser>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    let mut q = connections::table
        .filter(
            connections::sender_id
                .eq(profile.id)
                .or(connections::receiver_id.eq(profile.id)),
        )
        .order(connections::created_at.desc())
        .into_boxed();

    if query.status != "all" {
        q = q.filter(connections::status.eq(query.status.clone()));
    }

    let rows: Vec<Connection> = q.load(&mut conn)?;

    // Attach the counterpart's public fields, resolved in one query.
    let other_ids: Vec<Uuid> = rows
        .iter()
        .map(|c| if c.sender_id == profile.id { c.receiver_id } else { c.sender_id })
        .collect();

    let others: Vec<(Uuid, String, Option<String>, String, String)> = users::table
        .filter(users::id.eq_any(&other_ids))
        .select((
            users::id,
            users::name,
            users::profile_pic,
            users::roll_number,
            users::department,
        ))
        .load(&mut conn)?;

    let by_id: HashMap<Uuid, PublicUser> = others
        .into_iter()
        .map(|(id, name, profile_pic, roll_number, department)| {
            (id, PublicUser { name, profile_pic, roll_number, department })
        })
        .collect();

    let enriched = rows
        .into_iter()
        .map(|c| {
            let is_sender = c.sender_id == profile.id;
            let other_id = if is_sender { c.receiver_id } else { c.sender_id };
            ConnectionWithUser {
                other_user: by_id.get(&other_id).cloned(),
                is_sender,
                connection: c,
            }
        })
        .collect();

    Ok(Json(enriched))
}

// --- PUT /connections/:id ---

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub status: Option<String>,
}

/// The receiver may accept or reject; the sender may only reject
/// (cancellation). Anyone else is turned away.
fn can_update_status(connection: &Connection, user_id: Uuid, new_status: &str) -> bool {
    let is_receiver = connection.receiver_id == user_id;
    let is_sender = connection.sender_id == user_id;

    ((new_status == STATUS_ACCEPTED || new_status == STATUS_REJECTED) && is_receiver)
        || (new_status == STATUS_REJECTED && is_sender)
}

pub async fn update_connection(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateConnectionRequest>,
) -> AppResult<Json<Connection>> {
    let status = req.status.unwrap_or_default();
    if status != STATUS_ACCEPTED && status != STATUS_REJECTED {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "Valid status (accepted/rejected) is required",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    let connection: Connection = connections::table
        .find(id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "Connection not found"))?;

    if !can_update_status(&connection, profile.id, &status) {
        return Err(AppError::new(
            ErrorCode::Forbidden,
            "Not authorized to update this connection",
        ));
    }

    // No terminal-state guard: an already accepted/rejected connection may
    // be transitioned again (see DESIGN.md).
    let updated: Connection = diesel::update(connections::table.find(id))
        .set((
            connections::status.eq(status.as_str()),
            connections::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)?;

    tracing::info!(connection_id = %updated.id, status = %updated.status, "connection updated");

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(sender_id: Uuid, receiver_id: Uuid) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn receiver_may_accept_or_reject() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let c = connection(sender, receiver);

        assert!(can_update_status(&c, receiver, STATUS_ACCEPTED));
        assert!(can_update_status(&c, receiver, STATUS_REJECTED));
    }

    #[test]
    fn sender_may_only_reject() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let c = connection(sender, receiver);

        assert!(can_update_status(&c, sender, STATUS_REJECTED));
        assert!(!can_update_status(&c, sender, STATUS_ACCEPTED));
    }

    #[test]
    fn strangers_may_do_nothing() {
        let c = connection(Uuid::new_v4(), Uuid::new_v4());
        let stranger = Uuid::new_v4();

        assert!(!can_update_status(&c, stranger, STATUS_ACCEPTED));
        assert!(!can_update_status(&c, stranger, STATUS_REJECTED));
    }

    #[test]
    fn unknown_statuses_never_authorize() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let c = connection(sender, receiver);

        assert!(!can_update_status(&c, receiver, STATUS_PENDING));
        assert!(!can_update_status(&c, sender, "withdrawn"));
    }
}
