use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ActionResponseChunk;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub user_id: i64,
    pub handler_name: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: serde_json::Value,
    pub title: String,
    pub raw_text: String,
    pub response_chunks: Vec<ActionResponseChunk>,
}
