pub mod chats;
pub mod connections;
pub mod health;
pub mod sessions;
pub mod skills;
pub mod users;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::User;
use crate::schema::users::dsl as users_dsl;

/// Resolve the caller's external credential id to their profile row.
pub(crate) fn resolve_profile(conn: &mut PgConnection, credential_id: Uuid) -> AppResult<User> {
    users_dsl::users
        .filter(users_dsl::credential_id.eq(credential_id))
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "User profile not found"))
}
