use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{chats, connections, sessions, skills, users};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_REJECTED: &str = "rejected";

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub credential_id: Uuid,
    pub name: String,
    pub roll_number: String,
    pub department: String,
    pub year: i32,
    pub bio: String,
    pub skills: serde_json::Value,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub credential_id: Uuid,
    pub name: String,
    pub roll_number: String,
    pub department: String,
    pub year: i32,
    pub bio: String,
    pub skills: serde_json::Value,
}

/// The counterpart fields exposed on enriched connections.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    pub name: String,
    pub profile_pic: Option<String>,
    pub roll_number: String,
    pub department: String,
}

// --- Connection ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = connections)]
pub struct Connection {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnection {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
}

// --- ChatMessage ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = chats)]
pub struct ChatMessage {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chats)]
pub struct NewChatMessage {
    pub connection_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
}

// --- Skill ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = skills)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = skills)]
pub struct NewSkill {
    pub user_id: Uuid,
    pub skill_name: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// A skill joined with its owner's display fields. This is what the feed
/// returns and what the feed cache stores as serialized JSON.
#[derive(Debug, Queryable, Serialize, Deserialize, Clone, PartialEq)]
pub struct SkillPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_pic: Option<String>,
    pub roll_number: String,
    pub department: String,
}

impl SkillPost {
    pub fn from_parts(skill: Skill, owner: &User) -> Self {
        Self {
            id: skill.id,
            user_id: skill.user_id,
            skill_name: skill.skill_name,
            description: skill.description,
            image_url: skill.image_url,
            created_at: skill.created_at,
            user_name: owner.name.clone(),
            user_pic: owner.profile_pic.clone(),
            roll_number: owner.roll_number.clone(),
            department: owner.department.clone(),
        }
    }
}

// --- Session ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub place: Option<String>,
    pub session_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub connection_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub place: Option<String>,
    pub session_count: i32,
}
