use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};
use skillswap_shared::types::auth::AuthUser;

use crate::models::{NewUser, User};
use crate::roll;
use crate::schema::users;
use crate::AppState;

// --- POST /users ---

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub year: Option<i32>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

pub async fn create_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<User>> {
    let name = req.name.as_deref().map(str::trim).unwrap_or("");
    let roll_number = req.roll_number.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() || roll_number.is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "Missing required fields",
        ));
    }

    // Department and year fall back to what the roll number encodes.
    let department = req
        .department
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| roll::department_from_roll_number(roll_number).map(str::to_string));
    let year = req.year.or_else(|| roll::year_from_roll_number(roll_number));

    let (department, year) = match (department, year) {
        (Some(department), Some(year)) => (department, year),
        _ => {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "Missing required fields",
            ))
        }
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let roll_taken: bool = users::table
        .filter(users::roll_number.eq(roll_number))
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if roll_taken {
        return Err(AppError::new(
            ErrorCode::RollNumberTaken,
            "Roll number already exists",
        ));
    }

    let skills_json = serde_json::to_value(req.skills.unwrap_or_default())
        .map_err(|e| AppError::internal(e.to_string()))?;

    let new_user = NewUser {
        credential_id: user.id,
        name: name.to_string(),
        roll_number: roll_number.to_string(),
        department,
        year,
        bio: req.bio.unwrap_or_default(),
        skills: skills_json,
    };

    let created: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)?;

    tracing::info!(
        user_id = %created.id,
        roll_number = %created.roll_number,
        department = %created.department,
        "user profile created"
    );

    Ok(Json(created))
}

// --- GET /users?id= ---

#[derive(Debug, Deserialize)]
pub struct GetUserQuery {
    pub id: Option<String>,
}

pub async fn get_user(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetUserQuery>,
) -> AppResult<Json<User>> {
    let raw = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "User ID is required"))?;
    let id = Uuid::parse_str(&raw)
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "Invalid user ID"))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let found = users::table
        .find(id)
        .first::<User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "User not found"))?;

    Ok(Json(found))
}

// --- GET /users/me ---

pub async fn get_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<User>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;
    Ok(Json(profile))
}
