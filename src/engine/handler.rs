use async_trait::async_trait;

use crate::domain::{ActionHandlerConfiguration, User};

use super::EngineFacade;

/// Everything a handler's `handle` call needs, gathered up front by the
/// engine so the handler never has to re-fetch ownership-checked state
/// itself.
pub struct HandlerContext {
    pub action_id: i64,
    pub request: serde_json::Value,
    pub user: User,
    pub handler_user_config: ActionHandlerConfiguration,
    pub facade: EngineFacade,
}

/// A pluggable handler for the action execution engine.
///
/// `can_handle` is pure and must not block or mutate state — the engine
/// calls it synchronously while holding nothing but the registry. Handlers
/// mutate state only through `HandlerContext::facade`; reading the data
/// accessor directly is fine, writing through it directly is not (writes
/// need to be announced on the bus).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable name this handler is registered and looked up under
    /// (matches `Action::handler_name` and
    /// `ActionHandlerConfiguration::action_handler_name`).
    fn name(&self) -> &str;

    fn can_handle(&self, request: &serde_json::Value) -> bool;

    /// Called once at engine start, in registration order. A handler may
    /// stash `facade` to call back into the engine later (e.g. a
    /// background continuation calling `complete_action`).
    async fn startup(&self, facade: EngineFacade) {
        let _ = facade;
    }

    /// Called once at engine stop.
    async fn shutdown(&self) {}

    /// Invoked on a worker-pool task. Returning `true` tells the engine to
    /// mark the action completed immediately after this call returns;
    /// `false` means the handler has taken responsibility for calling
    /// `complete_action` itself later.
    async fn handle(&self, ctx: HandlerContext) -> anyhow::Result<bool>;
}
