//! Row structs mapped 1:1 onto the schema in `migrations/0001_init.sql`.
//!
//! Kept deliberately separate from [`crate::domain`], mirroring the
//! original's `db_models` vs `models` split — nothing outside `db::`
//! should ever see one of these.

use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub is_active: bool,
    pub email: String,
    pub password_version: i32,
    pub password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ThreadRow {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ActionRow {
    pub id: i64,
    pub user_id: i64,
    pub handler_name: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: serde_json::Value,
    pub title: String,
    pub raw_text: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ThreadActionRow {
    pub id: i64,
    pub thread_id: i64,
    pub action_id: i64,
    pub display_order: i32,
    pub show_question: bool,
    pub show_answer: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ActionResponseChunkRow {
    pub id: i64,
    pub action_id: i64,
    pub order: i32,
    pub mime: String,
    pub text_content: Option<String>,
    pub binary_content: Option<Vec<u8>>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ActionHandlerConfigurationRow {
    pub id: i64,
    pub action_handler_name: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub configuration: serde_json::Value,
}

impl From<UserRow> for crate::domain::User {
    fn from(row: UserRow) -> Self {
        crate::domain::User {
            id: row.id,
            is_active: row.is_active,
            email: row.email,
            password_version: row.password_version,
            password_hash: row.password_hash,
        }
    }
}

impl From<ThreadRow> for crate::domain::ThreadSummary {
    fn from(row: ThreadRow) -> Self {
        crate::domain::ThreadSummary {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            title: row.title,
            description: row.description,
        }
    }
}

impl From<ActionResponseChunkRow> for crate::domain::ActionResponseChunk {
    fn from(row: ActionResponseChunkRow) -> Self {
        crate::domain::ActionResponseChunk {
            id: row.id,
            action_id: row.action_id,
            order: row.order,
            mime: row.mime,
            text_content: row.text_content,
            binary_content: row.binary_content,
        }
    }
}

impl From<ActionHandlerConfigurationRow> for crate::domain::ActionHandlerConfiguration {
    fn from(row: ActionHandlerConfigurationRow) -> Self {
        crate::domain::ActionHandlerConfiguration {
            id: row.id,
            action_handler_name: row.action_handler_name,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            configuration: row.configuration,
        }
    }
}
