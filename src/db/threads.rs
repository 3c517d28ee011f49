use crate::domain::{Action, ActionResponseChunk, Thread, ThreadAction, ThreadSummary};
use crate::error::{CoreError, CoreResult};

use super::rows::{ActionResponseChunkRow, ActionRow, ThreadActionRow, ThreadRow};
use super::DataAccessor;

impl DataAccessor {
    pub async fn create_thread(&self, title: &str, description: &str, user_id: i64) -> CoreResult<Thread> {
        let row: ThreadRow = sqlx::query_as(
            r#"INSERT INTO threads (user_id, title, description) VALUES ($1, $2, $3)
               RETURNING id, user_id, created_at, title, description"#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Thread {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            title: row.title,
            description: row.description,
            thread_actions: Vec::new(),
        })
    }

    /// Ownership-checked: a thread owned by someone else is reported the
    /// same as a thread that doesn't exist.
    pub async fn get_thread(&self, id: i64, user_id: i64) -> CoreResult<Thread> {
        let thread_row: ThreadRow = sqlx::query_as(
            "SELECT id, user_id, created_at, title, description FROM threads WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found_id("Thread", id))?;

        let ta_rows: Vec<ThreadActionRow> = sqlx::query_as(
            r#"SELECT id, thread_id, action_id, display_order, show_question, show_answer
               FROM thread_actions WHERE thread_id = $1 ORDER BY display_order ASC"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut thread_actions = Vec::with_capacity(ta_rows.len());
        for ta in ta_rows {
            let action_row: ActionRow = sqlx::query_as(
                r#"SELECT id, user_id, handler_name, is_completed, created_at, completed_at, request, title, raw_text
                   FROM actions WHERE id = $1"#,
            )
            .bind(ta.action_id)
            .fetch_one(&self.pool)
            .await?;

            let chunk_rows: Vec<ActionResponseChunkRow> = sqlx::query_as(
                r#"SELECT id, action_id, "order", mime, text_content, binary_content
                   FROM action_response_chunks WHERE action_id = $1 ORDER BY "order" ASC"#,
            )
            .bind(ta.action_id)
            .fetch_all(&self.pool)
            .await?;

            let response_chunks: Vec<ActionResponseChunk> = chunk_rows.into_iter().map(Into::into).collect();

            thread_actions.push(ThreadAction {
                id: ta.id,
                thread_id: ta.thread_id,
                action_id: ta.action_id,
                display_order: ta.display_order,
                show_question: ta.show_question,
                show_answer: ta.show_answer,
                action: Action {
                    id: action_row.id,
                    user_id: action_row.user_id,
                    handler_name: action_row.handler_name,
                    is_completed: action_row.is_completed,
                    created_at: action_row.created_at,
                    completed_at: action_row.completed_at,
                    request: action_row.request,
                    title: action_row.title,
                    raw_text: action_row.raw_text,
                    response_chunks,
                },
            });
        }

        Ok(Thread {
            id: thread_row.id,
            user_id: thread_row.user_id,
            created_at: thread_row.created_at,
            title: thread_row.title,
            description: thread_row.description,
            thread_actions,
        })
    }

    pub async fn list_threads(&self, user_id: i64) -> CoreResult<Vec<ThreadSummary>> {
        let rows: Vec<ThreadRow> = sqlx::query_as(
            "SELECT id, user_id, created_at, title, description FROM threads WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn patch_thread(
        &self,
        id: i64,
        user_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> CoreResult<()> {
        if title.is_none() && description.is_none() {
            return self.assert_thread_owned(id, user_id).await;
        }

        let result = sqlx::query(
            r#"UPDATE threads SET
                 title = COALESCE($3, title),
                 description = COALESCE($4, description)
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found_id("Thread", id));
        }
        Ok(())
    }

    pub async fn delete_thread(&self, id: i64, user_id: i64) -> CoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM threads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(CoreError::not_found_id("Thread", id));
        }

        // thread_actions cascade via the foreign key's ON DELETE CASCADE;
        // the actions themselves are untouched.
        tx.commit().await?;
        Ok(())
    }

    async fn assert_thread_owned(&self, id: i64, user_id: i64) -> CoreResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM threads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        found.map(|_| ()).ok_or_else(|| CoreError::not_found_id("Thread", id))
    }
}
