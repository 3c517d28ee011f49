use crate::domain::ActionResponseChunk;
use crate::error::{CoreError, CoreResult};

use super::rows::ActionResponseChunkRow;
use super::DataAccessor;

impl DataAccessor {
    /// Appends a response chunk to an action, assigning it the next dense
    /// `order`. Rejected once the action is completed — enforced here, at
    /// the storage boundary, rather than trusted to callers.
    pub async fn append_response_to_action(
        &self,
        action_id: i64,
        mime: &str,
        text_content: Option<&str>,
        binary_content: Option<&[u8]>,
    ) -> CoreResult<ActionResponseChunk> {
        let mut tx = self.pool.begin().await?;

        if self.is_action_completed(&mut *tx, action_id).await? {
            tx.rollback().await?;
            return Err(CoreError::not_found_id("Action", action_id));
        }

        let next_order: i32 = sqlx::query_scalar(
            r#"SELECT COALESCE(MAX("order"), 0) + 1 FROM action_response_chunks WHERE action_id = $1"#,
        )
        .bind(action_id)
        .fetch_one(&mut *tx)
        .await?;

        let row: ActionResponseChunkRow = sqlx::query_as(
            r#"INSERT INTO action_response_chunks (action_id, "order", mime, text_content, binary_content)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, action_id, "order", mime, text_content, binary_content"#,
        )
        .bind(action_id)
        .bind(next_order)
        .bind(mime)
        .bind(text_content)
        .bind(binary_content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
