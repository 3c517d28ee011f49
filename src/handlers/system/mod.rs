//! The system handler: verb parsing, `html`/`markdown`/`mermaid`
//! passthrough, `config` get/set, and the `python` verb's per-user
//! persistent evaluation session.

mod config_verb;
mod interpreter;
mod passthrough;
mod python_verb;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::engine::{EngineFacade, Handler, HandlerContext};

use interpreter::InterpreterSessions;

pub const HANDLER_NAME: &str = "system";

/// `{type, command_text, args}`.
#[derive(Debug, Deserialize)]
struct SystemRequest {
    #[serde(rename = "type")]
    verb: String,
    #[serde(default)]
    command_text: String,
    #[serde(default)]
    args: String,
}

pub struct SystemHandler {
    sessions: InterpreterSessions,
    users_home_dir: PathBuf,
}

impl SystemHandler {
    pub fn new(users_home_dir: PathBuf) -> Self {
        Self { sessions: InterpreterSessions::new(), users_home_dir }
    }
}

#[async_trait]
impl Handler for SystemHandler {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    fn can_handle(&self, request: &serde_json::Value) -> bool {
        matches!(
            request.get("type").and_then(|v| v.as_str()),
            Some("html" | "markdown" | "mermaid" | "config" | "python")
        )
    }

    #[instrument(skip(self, ctx), fields(action_id = ctx.action_id))]
    async fn handle(&self, ctx: HandlerContext) -> anyhow::Result<bool> {
        let request: SystemRequest = serde_json::from_value(ctx.request)?;

        dispatch(&ctx.facade, &self.sessions, &self.users_home_dir, ctx.action_id, ctx.user.id, &request).await?;

        Ok(true)
    }
}

async fn dispatch(
    facade: &EngineFacade,
    sessions: &InterpreterSessions,
    users_home_dir: &PathBuf,
    action_id: i64,
    user_id: i64,
    request: &SystemRequest,
) -> crate::error::CoreResult<()> {
    match request.verb.as_str() {
        "html" | "markdown" | "mermaid" => {
            passthrough::handle(facade, action_id, &request.verb, &request.command_text).await
        }
        "config" => config_verb::handle(facade, action_id, user_id, &request.args, &request.command_text).await,
        "python" => {
            python_verb::handle(
                facade,
                sessions,
                users_home_dir,
                action_id,
                user_id,
                &request.args,
                &request.command_text,
            )
            .await
        }
        other => unreachable!("can_handle admitted an unsupported verb {other}"),
    }
}
