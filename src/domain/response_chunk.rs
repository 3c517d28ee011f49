use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponseChunk {
    pub id: i64,
    pub action_id: i64,
    pub order: i32,
    pub mime: String,
    pub text_content: Option<String>,
    #[serde(skip_serializing)]
    pub binary_content: Option<Vec<u8>>,
}

impl ActionResponseChunk {
    pub fn is_binary(&self) -> bool {
        self.binary_content.is_some()
    }
}
