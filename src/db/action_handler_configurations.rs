use chrono::Utc;

use crate::domain::ActionHandlerConfiguration;
use crate::error::CoreResult;

use super::rows::ActionHandlerConfigurationRow;
use super::DataAccessor;

impl DataAccessor {
    /// Returns the empty mapping `{}` when the user has never configured
    /// this handler, rather than an error.
    pub async fn get_action_handler_user_config(
        &self,
        handler_name: &str,
        user_id: i64,
    ) -> CoreResult<ActionHandlerConfiguration> {
        let row: Option<ActionHandlerConfigurationRow> = sqlx::query_as(
            r#"SELECT id, action_handler_name, user_id, created_at, updated_at, configuration
               FROM action_handler_configurations WHERE action_handler_name = $1 AND user_id = $2"#,
        )
        .bind(handler_name)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into).unwrap_or_else(|| ActionHandlerConfiguration {
            id: 0,
            action_handler_name: handler_name.to_string(),
            user_id,
            created_at: Utc::now(),
            updated_at: None,
            configuration: serde_json::json!({}),
        }))
    }

    pub async fn set_action_handler_user_config(
        &self,
        handler_name: &str,
        user_id: i64,
        configuration: &serde_json::Value,
    ) -> CoreResult<ActionHandlerConfiguration> {
        let row: ActionHandlerConfigurationRow = sqlx::query_as(
            r#"INSERT INTO action_handler_configurations (action_handler_name, user_id, configuration)
               VALUES ($1, $2, $3)
               ON CONFLICT (action_handler_name, user_id)
               DO UPDATE SET configuration = EXCLUDED.configuration, updated_at = now()
               RETURNING id, action_handler_name, user_id, created_at, updated_at, configuration"#,
        )
        .bind(handler_name)
        .bind(user_id)
        .bind(configuration)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
