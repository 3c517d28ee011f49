use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::bus::{thread_topic, BusClient, NotificationEvent};
use crate::db::DataAccessor;
use crate::domain::{Action, ActionHandlerConfiguration, ActionResponseChunk};
use crate::error::CoreResult;

use super::Handler;

/// The narrow façade handed to a handler's `startup`. Handlers hold this,
/// never the engine itself — it exposes only the calls a handler is
/// permitted to make.
#[derive(Clone)]
pub struct EngineFacade {
    pub(super) data: Arc<DataAccessor>,
    pub(super) bus: BusClient,
    pub(super) resource_dir: PathBuf,
    pub(super) handlers: Arc<Vec<Arc<dyn Handler>>>,
}

impl EngineFacade {
    /// Persists the chunk (assigning `order`), writes binary content the
    /// engine knows how to store as a file, and fans out one
    /// "action-response-chunk" notification per thread hosting the action.
    /// For a chunk with binary content, the published event's
    /// `text_content` is rewritten to the `<action_id>/<chunk_id>.<ext>`
    /// resource pointer rather than forwarding the (always-null)
    /// persisted `text_content` — otherwise subscribers would have no way
    /// to locate the bytes that were just written to disk.
    #[instrument(skip(self, text_content, binary_content))]
    pub async fn append_response_to_action(
        &self,
        action_id: i64,
        mime: &str,
        text_content: Option<&str>,
        binary_content: Option<&[u8]>,
    ) -> CoreResult<ActionResponseChunk> {
        let chunk = self.data.append_response_to_action(action_id, mime, text_content, binary_content).await?;

        let mut resource_pointer = None;
        if let Some(bytes) = chunk.binary_content.as_deref() {
            if let Some(ext) = known_binary_extension(mime) {
                match crate::resources::write_binary_chunk(&self.resource_dir, action_id, chunk.id, ext, bytes).await {
                    Ok(_) => resource_pointer = Some(format!("{action_id}/{}.{ext}", chunk.id)),
                    Err(err) => {
                        tracing::warn!(action_id, chunk_id = chunk.id, %err, "failed to persist binary response chunk to disk");
                    }
                }
            }
        }

        let thread_ids = self.data.get_thread_ids_for_action(action_id).await?;
        let event = NotificationEvent::ActionResponseChunk {
            id: chunk.id,
            action_id: chunk.action_id,
            order: chunk.order,
            mime: chunk.mime.clone(),
            text_content: resource_pointer.or_else(|| chunk.text_content.clone()),
        };
        let topics = thread_ids.into_iter().map(thread_topic).collect();
        let _ = self.bus.publish_many(topics, event).await;

        Ok(chunk)
    }

    /// Transitions the action (the data accessor raises if it's already
    /// completed) and fans out an "action-completed" notification to
    /// every thread hosting it.
    #[instrument(skip(self))]
    pub async fn complete_action(&self, action_id: i64, user_id: i64) -> CoreResult<DateTime<Utc>> {
        let completed_at = self.data.complete_action(action_id, user_id).await?;

        let thread_ids = self.data.get_thread_ids_for_action(action_id).await?;
        let event = NotificationEvent::ActionCompleted { action_id, completed_at };
        let topics = thread_ids.into_iter().map(thread_topic).collect();
        let _ = self.bus.publish_many(topics, event).await;

        Ok(completed_at)
    }

    pub async fn get_action_handler_user_config(
        &self,
        handler_name: &str,
        user_id: i64,
    ) -> CoreResult<ActionHandlerConfiguration> {
        self.data.get_action_handler_user_config(handler_name, user_id).await
    }

    pub async fn set_action_handler_user_config(
        &self,
        handler_name: &str,
        user_id: i64,
        configuration: &serde_json::Value,
    ) -> CoreResult<ActionHandlerConfiguration> {
        self.data.set_action_handler_user_config(handler_name, user_id, configuration).await
    }

    pub fn get_action_handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.iter().find(|h| h.name() == name).cloned()
    }

    /// Read-only access to the data accessor — handlers may read directly
    /// but must route writes that need to be announced through this
    /// façade.
    pub fn data(&self) -> &DataAccessor {
        &self.data
    }

    pub async fn get_action(&self, action_id: i64, user_id: i64) -> CoreResult<Action> {
        self.data.get_action(action_id, user_id).await
    }
}

fn known_binary_extension(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        _ => None,
    }
}
