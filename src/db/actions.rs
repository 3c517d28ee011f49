use chrono::Utc;

use crate::domain::{Action, ActionResponseChunk};
use crate::error::{CoreError, CoreResult};

use super::rows::{ActionResponseChunkRow, ActionRow};
use super::DataAccessor;

impl DataAccessor {
    pub async fn create_action(
        &self,
        handler_name: &str,
        request: &serde_json::Value,
        title: &str,
        raw_text: &str,
        user_id: i64,
    ) -> CoreResult<Action> {
        let row: ActionRow = sqlx::query_as(
            r#"INSERT INTO actions (user_id, handler_name, request, title, raw_text)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, user_id, handler_name, is_completed, created_at, completed_at, request, title, raw_text"#,
        )
        .bind(user_id)
        .bind(handler_name)
        .bind(request)
        .bind(title)
        .bind(raw_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(Action {
            id: row.id,
            user_id: row.user_id,
            handler_name: row.handler_name,
            is_completed: row.is_completed,
            created_at: row.created_at,
            completed_at: row.completed_at,
            request: row.request,
            title: row.title,
            raw_text: row.raw_text,
            response_chunks: Vec::new(),
        })
    }

    /// Ownership-checked: an action owned by someone else is reported the
    /// same as an action that doesn't exist.
    pub async fn get_action(&self, id: i64, user_id: i64) -> CoreResult<Action> {
        let row: ActionRow = sqlx::query_as(
            r#"SELECT id, user_id, handler_name, is_completed, created_at, completed_at, request, title, raw_text
               FROM actions WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found_id("Action", id))?;

        let chunk_rows: Vec<ActionResponseChunkRow> = sqlx::query_as(
            r#"SELECT id, action_id, "order", mime, text_content, binary_content
               FROM action_response_chunks WHERE action_id = $1 ORDER BY "order" ASC"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let response_chunks: Vec<ActionResponseChunk> = chunk_rows.into_iter().map(Into::into).collect();

        Ok(Action {
            id: row.id,
            user_id: row.user_id,
            handler_name: row.handler_name,
            is_completed: row.is_completed,
            created_at: row.created_at,
            completed_at: row.completed_at,
            request: row.request,
            title: row.title,
            raw_text: row.raw_text,
            response_chunks,
        })
    }

    pub async fn patch_action(&self, id: i64, user_id: i64, title: Option<&str>) -> CoreResult<()> {
        let result = sqlx::query("UPDATE actions SET title = COALESCE($3, title) WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .bind(title)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found_id("Action", id));
        }
        Ok(())
    }

    /// Completion is one-way: completing an already-completed action, or
    /// one that doesn't exist / isn't owned by `user_id`, raises
    /// `ObjectNotFound` — the transition query simply returns zero rows in
    /// both cases, and we cannot and do not distinguish them.
    pub async fn complete_action(&self, id: i64, user_id: i64) -> CoreResult<chrono::DateTime<Utc>> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE actions SET is_completed = TRUE, completed_at = $3 WHERE id = $1 AND user_id = $2 AND is_completed = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found_id("Action", id));
        }
        Ok(now)
    }

    /// Whether a given action is still open for appending response chunks.
    /// Used by [`DataAccessor::append_response_to_action`] to enforce the
    /// one-way completion invariant at the storage boundary.
    pub(super) async fn is_action_completed(
        &self,
        executor: impl sqlx::PgExecutor<'_>,
        action_id: i64,
    ) -> CoreResult<bool> {
        let completed: Option<bool> = sqlx::query_scalar("SELECT is_completed FROM actions WHERE id = $1")
            .bind(action_id)
            .fetch_optional(executor)
            .await?;
        completed.ok_or_else(|| CoreError::not_found_id("Action", action_id))
    }

    /// No ownership check: an internal lookup used by the bus and by
    /// handlers resolving whose rhai session an action belongs to.
    pub async fn get_action_user(&self, action_id: i64) -> CoreResult<Option<i64>> {
        let user_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM actions WHERE id = $1")
            .bind(action_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user_id)
    }
}
