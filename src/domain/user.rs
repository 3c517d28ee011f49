use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_active: bool,
    pub email: String,
    pub password_version: i32,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
