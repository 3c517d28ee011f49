use serde::{Deserialize, Serialize};

/// The stable wire contract emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NotificationEvent {
    ActionResponseChunk {
        id: i64,
        action_id: i64,
        order: i32,
        mime: String,
        text_content: Option<String>,
    },
    ActionCompleted {
        action_id: i64,
        completed_at: chrono::DateTime<chrono::Utc>,
    },
}

/// `"topic-<thread_id>"`, the only topic-naming convention the engine uses.
pub fn thread_topic(thread_id: i64) -> String {
    format!("topic-{thread_id}")
}
