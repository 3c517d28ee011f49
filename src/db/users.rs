use crate::domain::User;
use crate::error::{CoreError, CoreResult};

use super::rows::UserRow;
use super::DataAccessor;

impl DataAccessor {
    pub async fn create_user(&self, email: &str, password_hash: &str) -> CoreResult<User> {
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(CoreError::DuplicateUserEmail(email.to_string()));
        }

        let row: UserRow = sqlx::query_as(
            r#"INSERT INTO users (email, password_hash) VALUES ($1, $2)
               RETURNING id, is_active, email, password_version, password_hash"#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn get_user(&self, id: i64) -> CoreResult<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, is_active, email, password_version, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.ok_or_else(|| CoreError::not_found_id("User", id))?.into())
    }

    pub async fn get_user_by_email(&self, email: &str) -> CoreResult<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, is_active, email, password_version, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.ok_or_else(|| CoreError::not_found_id("User", email))?.into())
    }
}
