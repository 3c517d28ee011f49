use crate::domain::{Action, ThreadAction};
use crate::error::{CoreError, CoreResult};

use super::rows::{ActionRow, ThreadActionRow};
use super::DataAccessor;

impl DataAccessor {
    /// Appends an existing action to an existing thread, assigning it the
    /// next dense `display_order`. Both the thread and the action must be
    /// owned by `user_id`; the pair must not already be linked, which
    /// raises `ActionAlreadyInThread`.
    pub async fn append_action_to_thread(
        &self,
        thread_id: i64,
        action_id: i64,
        user_id: i64,
    ) -> CoreResult<ThreadAction> {
        let mut tx = self.pool.begin().await?;

        let thread_owned: Option<i64> = sqlx::query_scalar("SELECT id FROM threads WHERE id = $1 AND user_id = $2")
            .bind(thread_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if thread_owned.is_none() {
            tx.rollback().await?;
            return Err(CoreError::not_found_id("Thread", thread_id));
        }

        let action_row: ActionRow = match sqlx::query_as(
            r#"SELECT id, user_id, handler_name, is_completed, created_at, completed_at, request, title, raw_text
               FROM actions WHERE id = $1 AND user_id = $2"#,
        )
        .bind(action_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(row) => row,
            None => {
                tx.rollback().await?;
                return Err(CoreError::not_found_id("Action", action_id));
            }
        };

        let already: Option<i64> =
            sqlx::query_scalar("SELECT id FROM thread_actions WHERE thread_id = $1 AND action_id = $2")
                .bind(thread_id)
                .bind(action_id)
                .fetch_optional(&mut *tx)
                .await?;
        if already.is_some() {
            tx.rollback().await?;
            return Err(CoreError::ActionAlreadyInThread { thread_id, action_id });
        }

        let next_order: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM thread_actions WHERE thread_id = $1",
        )
        .bind(thread_id)
        .fetch_one(&mut *tx)
        .await?;

        let ta_row: ThreadActionRow = sqlx::query_as(
            r#"INSERT INTO thread_actions (thread_id, action_id, display_order)
               VALUES ($1, $2, $3)
               RETURNING id, thread_id, action_id, display_order, show_question, show_answer"#,
        )
        .bind(thread_id)
        .bind(action_id)
        .bind(next_order)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ThreadAction {
            id: ta_row.id,
            thread_id: ta_row.thread_id,
            action_id: ta_row.action_id,
            display_order: ta_row.display_order,
            show_question: ta_row.show_question,
            show_answer: ta_row.show_answer,
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
                response_chunks: Vec::new(),
            },
        })
    }

    /// Returns whether a row was actually removed.
    pub async fn remove_action_from_thread(&self, thread_id: i64, action_id: i64, user_id: i64) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"DELETE FROM thread_actions
               WHERE thread_id = $1 AND action_id = $2
                 AND thread_id IN (SELECT id FROM threads WHERE user_id = $3)"#,
        )
        .bind(thread_id)
        .bind(action_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn patch_thread_action(
        &self,
        thread_id: i64,
        action_id: i64,
        user_id: i64,
        show_question: Option<bool>,
        show_answer: Option<bool>,
    ) -> CoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE thread_actions SET
                 show_question = COALESCE($4, show_question),
                 show_answer = COALESCE($5, show_answer)
               WHERE thread_id = $1 AND action_id = $2
                 AND thread_id IN (SELECT id FROM threads WHERE user_id = $3)"#,
        )
        .bind(thread_id)
        .bind(action_id)
        .bind(user_id)
        .bind(show_question)
        .bind(show_answer)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found_id("ThreadAction", format!("{thread_id}/{action_id}")));
        }
        Ok(())
    }

    /// No ownership check: an internal lookup used by the bus to fan out
    /// notifications to every thread hosting an action.
    pub async fn get_thread_ids_for_action(&self, action_id: i64) -> CoreResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT thread_id FROM thread_actions WHERE action_id = $1")
            .bind(action_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
