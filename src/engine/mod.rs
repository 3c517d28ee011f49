//! The action execution engine: handler discovery, dispatch onto a bounded
//! worker pool, and the create → append-response* → complete lifecycle.

mod facade;
mod handler;

pub use facade::EngineFacade;
pub use handler::{Handler, HandlerContext};

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, instrument, warn};

use crate::bus::BusClient;
use crate::db::DataAccessor;
use crate::domain::ThreadAction;
use crate::error::{CoreError, CoreResult};

/// Owns the handler registry, a semaphore-bounded worker pool (each
/// dispatch acquires a permit before `tokio::spawn` rather than reaching
/// for a dedicated thread-pool crate), the data accessor, and the bus.
pub struct ActionEngine {
    registry: Vec<Arc<dyn Handler>>,
    pool_permits: Arc<Semaphore>,
    worker_pool_size: usize,
    data: Arc<DataAccessor>,
    bus: BusClient,
    resource_dir: PathBuf,
}

impl ActionEngine {
    pub fn new(
        handlers: Vec<Arc<dyn Handler>>,
        worker_pool_size: usize,
        data: Arc<DataAccessor>,
        bus: BusClient,
        resource_dir: PathBuf,
    ) -> Self {
        Self {
            registry: handlers,
            pool_permits: Arc::new(Semaphore::new(worker_pool_size)),
            worker_pool_size,
            data,
            bus,
            resource_dir,
        }
    }

    fn facade(&self) -> EngineFacade {
        EngineFacade {
            data: self.data.clone(),
            bus: self.bus.clone(),
            resource_dir: self.resource_dir.clone(),
            handlers: Arc::new(self.registry.clone()),
        }
    }

    /// Calls `startup` on every handler in registration order. A handler
    /// whose startup fails is logged and the engine keeps serving with the
    /// rest.
    pub async fn startup(&self) {
        let facade = self.facade();
        for handler in &self.registry {
            handler.startup(facade.clone()).await;
        }
    }

    /// Calls `shutdown` on every handler (tolerating failures), then waits
    /// for outstanding worker-pool tasks to finish by acquiring every
    /// permit back.
    pub async fn shutdown(&self) {
        for handler in &self.registry {
            handler.shutdown().await;
        }
        let _ = self.pool_permits.acquire_many(self.worker_pool_size as u32).await;
    }

    /// Dispatch:
    /// 1. Find the first handler for which `can_handle` is true.
    /// 2. Persist the action and append it to the thread in one unit of work.
    /// 3. Read the per-user handler config.
    /// 4. Schedule `run_handler` on the worker pool.
    /// 5. Return the freshly built `ThreadAction`.
    #[instrument(skip(self, request, title, raw_text))]
    pub async fn create_thread_action(
        &self,
        thread_id: i64,
        request: serde_json::Value,
        title: &str,
        raw_text: &str,
        user_id: i64,
    ) -> CoreResult<ThreadAction> {
        let handler = self
            .registry
            .iter()
            .find(|h| h.can_handle(&request))
            .cloned()
            .ok_or(CoreError::NoHandler)?;

        let action = self.data.create_action(handler.name(), &request, title, raw_text, user_id).await?;
        let thread_action = self.data.append_action_to_thread(thread_id, action.id, user_id).await?;

        let config = self.data.get_action_handler_user_config(handler.name(), user_id).await?;
        let user = self.data.get_user(user_id).await?;

        self.run_handler(handler, action.id, request, user, config);

        Ok(thread_action)
    }

    /// Schedules `handler.handle` on the worker pool. Panics and
    /// `JoinError`s are caught by the spawned task's own unwind boundary,
    /// logged, and the action is left pending rather than auto-completed.
    fn run_handler(
        &self,
        handler: Arc<dyn Handler>,
        action_id: i64,
        request: serde_json::Value,
        user: crate::domain::User,
        handler_user_config: crate::domain::ActionHandlerConfiguration,
    ) {
        let permits = self.pool_permits.clone();
        let facade = self.facade();
        let user_id = user.id;

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let ctx = HandlerContext { action_id, request, user, handler_user_config, facade: facade.clone() };

            let join_result = tokio::spawn(async move { handler.handle(ctx).await }).await;

            match join_result {
                Ok(Ok(true)) => {
                    if let Err(err) = facade.complete_action(action_id, user_id).await {
                        error!(action_id, %err, "failed to auto-complete action after handler returned true");
                    }
                }
                Ok(Ok(false)) => {
                    // Handler took responsibility for completion itself.
                }
                Ok(Err(err)) => {
                    error!(action_id, %err, "handler returned an error; leaving action pending");
                }
                Err(join_err) => {
                    if join_err.is_panic() {
                        error!(action_id, "handler panicked; leaving action pending");
                    } else {
                        warn!(action_id, "handler task was cancelled; leaving action pending");
                    }
                }
            }
        });
    }
}
