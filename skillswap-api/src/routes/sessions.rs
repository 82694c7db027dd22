use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};
use skillswap_shared::types::auth::AuthUser;

use crate::models::{Connection, NewSession, Session, STATUS_ACCEPTED};
use crate::schema::{connections, sessions};
use crate::AppState;

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

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "Invalid date or time"))
}

fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "Invalid date or time"))
}

/// A session may only be scheduled strictly in the future.
fn is_future(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> bool {
    date.and_time(time) > now
}

// --- POST /sessions ---

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub connection_id: Option<Uuid>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub place: Option<String>,
    pub session_count: Option<i32>,
}

pub async fn create_session(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<Json<Session>> {
    let (connection_id, date_raw, time_raw) =
        match (req.connection_id, req.date.as_deref(), req.time.as_deref()) {
            (Some(c), Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => (c, d, t),
            _ => {
                return Err(AppError::new(
                    ErrorCode::ValidationError,
                    "Connection ID, date, and time are required",
                ))
            }
        };

    let date = parse_date(date_raw)?;
    let time = parse_time(time_raw)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    accepted_connection(&mut conn, connection_id, profile.id)?.ok_or_else(|| {
        AppError::new(
            ErrorCode::ConnectionNotFound,
            "Connection not found or not accepted",
        )
    })?;

    if !is_future(date, time, Utc::now().naive_utc()) {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "Session must be scheduled for a future date and time",
        ));
    }

    let new_session = NewSession {
        connection_id,
        date,
        time,
        place: req.place.filter(|p| !p.trim().is_empty()),
        session_count: req.session_count.unwrap_or(1),
    };

    let created: Session = diesel::insert_into(sessions::table)
        .values(&new_session)
        .get_result(&mut conn)?;

    tracing::info!(session_id = %created.id, connection_id = %connection_id, "session scheduled");

    Ok(Json(created))
}

// --- GET /sessions ---

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    pub connection_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

pub async fn list_sessions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSessionsQuery>,
) -> AppResult<Json<SessionsResponse>> {
    let connection_id = query
        .connection_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "Connection ID is required"))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    participant_connection(&mut conn, connection_id, profile.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "Connection not found"))?;

    let rows: Vec<Session> = sessions::table
        .filter(sessions::connection_id.eq(connection_id))
        .order((sessions::date.asc(), sessions::time.asc()))
        .load(&mut conn)?;

    Ok(Json(SessionsResponse { sessions: rows }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn future_check_is_strict() {
        let now = Utc::now().naive_utc();
        let tomorrow = now + Duration::days(1);
        let yesterday = now - Duration::days(1);

        assert!(is_future(tomorrow.date(), tomorrow.time(), now));
        assert!(!is_future(yesterday.date(), yesterday.time(), now));
        assert!(!is_future(now.date(), now.time(), now));
    }

    #[test]
    fn dates_parse_iso_only() {
        assert!(parse_date("2030-06-15").is_ok());
        assert!(parse_date("15/06/2030").is_err());
        assert!(parse_date("2030-13-01").is_err());
    }

    #[test]
    fn times_parse_with_or_without_seconds() {
        assert_eq!(
            parse_time("14:30").unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("14:30:15").unwrap(),
            NaiveTime::from_hms_opt(14, 30, 15).unwrap()
        );
        assert!(parse_time("2pm").is_err());
    }
}
