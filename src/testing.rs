//! Test-only helpers: a stub [`Handler`] for exercising the engine's
//! dispatch logic without a concrete handler implementation, and helpers
//! for asserting against the bus from tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::{EngineFacade, Handler, HandlerContext};

/// A [`Handler`] whose behavior is supplied by the test: `accepts`
/// decides `can_handle`, `outcome` decides what `handle` returns. Counts
/// how many times each lifecycle method fired so tests can assert on
/// dispatch behavior (e.g. "startup was called exactly once per handler").
pub struct StubHandler {
    name: String,
    accepts: Box<dyn Fn(&serde_json::Value) -> bool + Send + Sync>,
    outcome: StubOutcome,
    pub startup_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub handle_calls: AtomicUsize,
}

pub enum StubOutcome {
    CompleteImmediately,
    DeferCompletion,
    Fail,
}

impl StubHandler {
    pub fn new(name: impl Into<String>, accepts: impl Fn(&serde_json::Value) -> bool + Send + Sync + 'static, outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            accepts: Box::new(accepts),
            outcome,
            startup_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            handle_calls: AtomicUsize::new(0),
        })
    }

    /// A stub that accepts requests with `{"type": type_value}`.
    pub fn for_type(name: impl Into<String>, type_value: impl Into<String>, outcome: StubOutcome) -> Arc<Self> {
        let type_value = type_value.into();
        Self::new(name, move |req| req.get("type").and_then(|v| v.as_str()) == Some(type_value.as_str()), outcome)
    }
}

#[async_trait]
impl Handler for StubHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, request: &serde_json::Value) -> bool {
        (self.accepts)(request)
    }

    async fn startup(&self, _facade: EngineFacade) {
        self.startup_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn handle(&self, ctx: HandlerContext) -> anyhow::Result<bool> {
        self.handle_calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            StubOutcome::CompleteImmediately => Ok(true),
            StubOutcome::DeferCompletion => {
                ctx.facade.complete_action(ctx.action_id, ctx.user.id).await?;
                Ok(false)
            }
            StubOutcome::Fail => anyhow::bail!("stub handler configured to fail"),
        }
    }
}
