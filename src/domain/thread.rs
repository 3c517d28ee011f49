use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ThreadAction;

/// A thread summary, as returned by `list_threads` — no nested actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

/// A fully hydrated thread, as returned by `get_thread` — its
/// [`ThreadAction`]s ordered by `display_order`, each carrying its
/// embedded [`Action`](super::Action) with response chunks ordered by `order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thread_actions: Vec<ThreadAction>,
}

impl From<Thread> for ThreadSummary {
    fn from(thread: Thread) -> Self {
        ThreadSummary {
            id: thread.id,
            user_id: thread.user_id,
            created_at: thread.created_at,
            title: thread.title,
            description: thread.description,
        }
    }
}
