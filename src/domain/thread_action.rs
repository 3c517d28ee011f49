use serde::{Deserialize, Serialize};

use super::Action;

/// The thread<->action junction, embedding the full [`Action`] it points to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadAction {
    pub id: i64,
    pub thread_id: i64,
    pub action_id: i64,
    pub display_order: i32,
    pub show_question: bool,
    pub show_answer: bool,
    pub action: Action,
}
