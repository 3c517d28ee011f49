//! Exercises `ActionEngine` dispatch and lifecycle against a real
//! Postgres and the in-tree `StubHandler`. Requires `DATABASE_URL`;
//! skips otherwise.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use webcli_core::bus::BusClient;
use webcli_core::db::DataAccessor;
use webcli_core::engine::{ActionEngine, Handler};
use webcli_core::error::CoreError;
use webcli_core::testing::{StubHandler, StubOutcome};

async fn poll_until_completed(data: &DataAccessor, action_id: i64, user_id: i64) -> bool {
    for _ in 0..50 {
        let action = data.get_action(action_id, user_id).await.unwrap();
        if action.is_completed {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn handler_returning_true_auto_completes_the_action() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "engine-auto").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();

    let stub: Arc<dyn Handler> = StubHandler::for_type("stub", "stub-type", StubOutcome::CompleteImmediately);
    let bus = BusClient::spawn(16);
    let engine = ActionEngine::new(vec![stub], 4, data.clone(), bus, std::env::temp_dir());
    engine.startup().await;

    let ta = engine
        .create_thread_action(thread.id, json!({"type": "stub-type"}), "title", "raw", user.id)
        .await
        .unwrap();

    assert!(poll_until_completed(&data, ta.action_id, user.id).await, "action never completed");
    engine.shutdown().await;
}

#[tokio::test]
async fn handler_returning_false_leaves_the_action_pending_until_it_completes_itself() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "engine-defer").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();

    let stub: Arc<dyn Handler> = StubHandler::for_type("stub", "stub-type", StubOutcome::DeferCompletion);
    let bus = BusClient::spawn(16);
    let engine = ActionEngine::new(vec![stub], 4, data.clone(), bus, std::env::temp_dir());
    engine.startup().await;

    let ta = engine
        .create_thread_action(thread.id, json!({"type": "stub-type"}), "title", "raw", user.id)
        .await
        .unwrap();

    assert!(poll_until_completed(&data, ta.action_id, user.id).await, "action never completed");
    engine.shutdown().await;
}

#[tokio::test]
async fn handler_that_fails_leaves_the_action_pending() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "engine-fail").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();

    let stub: Arc<dyn Handler> = StubHandler::for_type("stub", "stub-type", StubOutcome::Fail);
    let bus = BusClient::spawn(16);
    let engine = ActionEngine::new(vec![stub], 4, data.clone(), bus, std::env::temp_dir());
    engine.startup().await;

    let ta = engine
        .create_thread_action(thread.id, json!({"type": "stub-type"}), "title", "raw", user.id)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let action = data.get_action(ta.action_id, user.id).await.unwrap();
    assert!(!action.is_completed);
    engine.shutdown().await;
}

#[tokio::test]
async fn no_matching_handler_is_rejected_before_anything_is_persisted() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "engine-nohandler").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();

    let stub: Arc<dyn Handler> = StubHandler::for_type("stub", "stub-type", StubOutcome::CompleteImmediately);
    let bus = BusClient::spawn(16);
    let engine = ActionEngine::new(vec![stub], 4, data.clone(), bus, std::env::temp_dir());

    let result = engine.create_thread_action(thread.id, json!({"type": "unknown-type"}), "title", "raw", user.id).await;
    assert!(matches!(result, Err(CoreError::NoHandler)));
}

#[tokio::test]
async fn startup_and_shutdown_run_once_per_handler() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);

    let stub = StubHandler::for_type("stub", "stub-type", StubOutcome::CompleteImmediately);
    let bus = BusClient::spawn(16);
    let engine = ActionEngine::new(vec![stub.clone() as Arc<dyn Handler>], 4, data, bus, std::env::temp_dir());

    engine.startup().await;
    engine.shutdown().await;

    assert_eq!(stub.startup_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.shutdown_calls.load(Ordering::SeqCst), 1);
}
