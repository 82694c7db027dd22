use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use skillswap_shared::errors::{AppError, AppResult, ErrorCode};
use skillswap_shared::types::auth::AuthUser;

use crate::cache_ops;
use crate::models::{NewSkill, Skill, SkillPost};
use crate::schema::{skills, users};
use crate::AppState;

// --- POST /skills ---

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub skill_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

pub async fn create_skill(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSkillRequest>,
) -> AppResult<Json<SkillPost>> {
    let skill_name = req.skill_name.as_deref().map(str::trim).unwrap_or("");
    let description = req.description.as_deref().map(str::trim).unwrap_or("");
    if skill_name.is_empty() || description.is_empty() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "Skill name and description are required",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = super::resolve_profile(&mut conn, user.id)?;

    let new_skill = NewSkill {
        user_id: profile.id,
        skill_name: skill_name.to_string(),
        description: description.to_string(),
        image_url: req.image_url.filter(|u| !u.trim().is_empty()),
    };

    let skill: Skill = diesel::insert_into(skills::table)
        .values(&new_skill)
        .get_result(&mut conn)?;

    let post = SkillPost::from_parts(skill, &profile);

    // Best-effort read-modify-write of the shared feed window.
    cache_ops::prepend_skill_to_feed(state.cache.as_ref(), &post).await;

    tracing::info!(skill_id = %post.id, owner = %post.user_id, "skill posted");

    Ok(Json(post))
}

// --- GET /skills ---

#[derive(Debug, Deserialize)]
pub struct ListSkillsQuery {
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub search: Option<String>,
    pub department: Option<String>,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub skills: Vec<SkillPost>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// Department filter with the client's "no filter" sentinel.
fn effective_department(department: Option<&str>) -> Option<&str> {
    department.filter(|d| !d.is_empty() && *d != "All Departments")
}

/// The store matches with ILIKE; cached entries are filtered the same way
/// here, case-insensitive substring on name or description.
fn filter_posts(
    posts: Vec<SkillPost>,
    search: Option<&str>,
    department: Option<&str>,
) -> Vec<SkillPost> {
    let search = search.map(str::to_lowercase);
    posts
        .into_iter()
        .filter(|p| match &search {
            Some(s) => {
                p.skill_name.to_lowercase().contains(s)
                    || p.description.to_lowercase().contains(s)
            }
            None => true,
        })
        .filter(|p| match department {
            Some(d) => p.department == d,
            None => true,
        })
        .collect()
}

/// Page math for the cache path. The cache window was read with `limit`
/// entries, so `has_more` can only trip when filters are off and the read
/// over-delivered; in practice it reports the window's edge as the end.
fn page_from_cache(filtered: Vec<SkillPost>, limit: usize) -> FeedPage {
    let has_more = filtered.len() > limit;
    let next_cursor = filtered.get(limit).map(|p| p.id.to_string());
    let mut posts = filtered;
    posts.truncate(limit);
    FeedPage {
        skills: posts,
        has_more,
        next_cursor,
    }
}

/// Page math for the store path: `rows` were fetched with `limit + 1` to
/// detect whether another page exists.
fn page_from_store(mut rows: Vec<SkillPost>, limit: usize) -> FeedPage {
    let has_more = rows.len() > limit;
    rows.truncate(limit);
    let next_cursor = if has_more {
        rows.last().map(|p| p.created_at.to_rfc3339())
    } else {
        None
    };
    FeedPage {
        skills: rows,
        has_more,
        next_cursor,
    }
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSkillsQuery>,
) -> AppResult<Json<FeedPage>> {
    let limit = query.limit;
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let department = effective_department(query.department.as_deref());

    let cursor = match query.cursor.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::new(ErrorCode::ValidationError, "Invalid cursor"))?,
        ),
        None => None,
    };

    // A cursor always goes to the store; serving it from the recent-feed
    // window would re-serve the first page forever. Cursorless reads try
    // the cache, with search/department applied to the cached entries.
    if cursor.is_none() {
        if let Some(cached) = cache_ops::cached_skill_feed(state.cache.as_ref(), limit).await {
            let filtered = filter_posts(cached, search, department);
            if !filtered.is_empty() {
                return Ok(Json(page_from_cache(filtered, limit)));
            }
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut q = skills::table
        .inner_join(users::table)
        .select((
            skills::id,
            skills::user_id,
            skills::skill_name,
            skills::description,
            skills::image_url,
            skills::created_at,
            users::name,
            users::profile_pic,
            users::roll_number,
            users::department,
        ))
        .order(skills::created_at.desc())
        .limit(limit as i64 + 1)
        .into_boxed();

    if let Some(cursor) = cursor {
        q = q.filter(skills::created_at.lt(cursor));
    }
    if let Some(s) = search {
        let pattern = format!("%{s}%");
        q = q.filter(
            skills::skill_name
                .ilike(pattern.clone())
                .or(skills::description.ilike(pattern)),
        );
    }
    if let Some(d) = department {
        q = q.filter(users::department.eq(d.to_string()));
    }

    let rows: Vec<SkillPost> = q.load(&mut conn)?;

    // Only the plain recent view may refresh the shared cache; a filtered
    // or cursored result would poison it for everyone else.
    if query.cursor.is_none() && query.search.is_none() && query.department.is_none() {
        cache_ops::cache_skill_feed(state.cache.as_ref(), &rows).await;
    }

    Ok(Json(page_from_store(rows, limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn post(name: &str, description: &str, department: &str, offset_secs: i64) -> SkillPost {
        SkillPost {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            skill_name: name.to_string(),
            description: description.to_string(),
            image_url: None,
            created_at: Utc::now() + Duration::seconds(offset_secs),
            user_name: "owner".into(),
            user_pic: None,
            roll_number: "2021CS10001".into(),
            department: department.to_string(),
        }
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let posts = vec![
            post("Guitar", "Beginner lessons", "Computer Science", 3),
            post("Chess", "openings and endgames", "Physics", 2),
            post("Cooking", "guitar-shaped cakes", "Physics", 1),
        ];

        let hits = filter_posts(posts, Some("guitar"), None);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].skill_name, "Guitar");
        assert_eq!(hits[1].skill_name, "Cooking");
    }

    #[test]
    fn department_filter_is_exact() {
        let posts = vec![
            post("Guitar", "lessons", "Physics", 2),
            post("Chess", "lessons", "Computer Science", 1),
        ];

        let hits = filter_posts(posts, None, Some("Physics"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].skill_name, "Guitar");
    }

    #[test]
    fn all_departments_sentinel_disables_the_filter() {
        assert_eq!(effective_department(Some("All Departments")), None);
        assert_eq!(effective_department(Some("")), None);
        assert_eq!(effective_department(Some("Physics")), Some("Physics"));
        assert_eq!(effective_department(None), None);
    }

    #[test]
    fn cache_page_slices_and_reports_overflow() {
        let posts: Vec<SkillPost> = (0..5).map(|n| post("s", "d", "CS", n)).collect();
        let overflow_id = posts[3].id;

        let page = page_from_cache(posts, 3);
        assert_eq!(page.skills.len(), 3);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, Some(overflow_id.to_string()));
    }

    #[test]
    fn cache_page_at_window_edge_reports_the_end() {
        let posts: Vec<SkillPost> = (0..3).map(|n| post("s", "d", "CS", n)).collect();
        let page = page_from_cache(posts, 3);
        assert_eq!(page.skills.len(), 3);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn store_page_detects_more_via_the_extra_row() {
        let rows: Vec<SkillPost> = (0..4).rev().map(|n| post("s", "d", "CS", n)).collect();
        let last_kept = rows[2].created_at;

        let page = page_from_store(rows, 3);
        assert_eq!(page.skills.len(), 3);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, Some(last_kept.to_rfc3339()));
    }

    #[test]
    fn store_page_without_extra_row_has_no_cursor() {
        let rows: Vec<SkillPost> = (0..2).rev().map(|n| post("s", "d", "CS", n)).collect();
        let page = page_from_store(rows, 3);
        assert_eq!(page.skills.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn store_cursor_round_trips_through_rfc3339() {
        let rows: Vec<SkillPost> = (0..4).rev().map(|n| post("s", "d", "CS", n)).collect();
        let page = page_from_store(rows, 3);

        let cursor = page.next_cursor.unwrap();
        let parsed = DateTime::parse_from_rfc3339(&cursor)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, page.skills.last().unwrap().created_at);
    }
}
