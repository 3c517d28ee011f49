//! End-to-end dispatch through `ActionEngine` into `SystemHandler`.
//! Requires `DATABASE_URL`; skips otherwise.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use webcli_core::bus::BusClient;
use webcli_core::engine::{ActionEngine, Handler};
use webcli_core::handlers::system::SystemHandler;

async fn wait_for_chunks(engine_data: &webcli_core::db::DataAccessor, action_id: i64, user_id: i64, at_least: usize) -> webcli_core::domain::Action {
    for _ in 0..50 {
        let action = engine_data.get_action(action_id, user_id).await.unwrap();
        if action.response_chunks.len() >= at_least {
            return action;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    engine_data.get_action(action_id, user_id).await.unwrap()
}

fn make_engine(data: Arc<webcli_core::db::DataAccessor>, home: std::path::PathBuf) -> ActionEngine {
    let handler: Arc<dyn Handler> = Arc::new(SystemHandler::new(home));
    let bus = BusClient::spawn(16);
    ActionEngine::new(vec![handler], 4, data, bus, std::env::temp_dir())
}

#[tokio::test]
async fn markdown_passthrough_echoes_command_text() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "sys-markdown").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let home = std::env::temp_dir().join(format!("webcli-test-{}", user.id));

    let engine = make_engine(data.clone(), home);
    engine.startup().await;

    let ta = engine
        .create_thread_action(thread.id, json!({"type": "markdown", "command_text": "# hi"}), "t", "# hi", user.id)
        .await
        .unwrap();

    let action = wait_for_chunks(&data, ta.action_id, user.id, 1).await;
    assert!(action.is_completed);
    assert_eq!(action.response_chunks[0].mime, "text/markdown");
    assert_eq!(action.response_chunks[0].text_content.as_deref(), Some("# hi"));

    engine.shutdown().await;
}

#[tokio::test]
async fn config_set_then_get_round_trips() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "sys-config").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let home = std::env::temp_dir().join(format!("webcli-test-{}", user.id));

    let engine = make_engine(data.clone(), home);
    engine.startup().await;

    let set_ta = engine
        .create_thread_action(
            thread.id,
            json!({"type": "config", "args": "set system", "command_text": "{\"verbosity\": \"debug\"}"}),
            "t",
            "raw",
            user.id,
        )
        .await
        .unwrap();
    wait_for_chunks(&data, set_ta.action_id, user.id, 0).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let get_ta = engine
        .create_thread_action(thread.id, json!({"type": "config", "args": "get system"}), "t", "raw", user.id)
        .await
        .unwrap();

    let action = wait_for_chunks(&data, get_ta.action_id, user.id, 1).await;
    let body: serde_json::Value = serde_json::from_str(action.response_chunks[0].text_content.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"verbosity": "debug"}));

    engine.shutdown().await;
}

#[tokio::test]
async fn config_set_with_invalid_json_reports_the_exact_error_message() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "sys-config-bad").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let home = std::env::temp_dir().join(format!("webcli-test-{}", user.id));

    let engine = make_engine(data.clone(), home);
    engine.startup().await;

    let ta = engine
        .create_thread_action(
            thread.id,
            json!({"type": "config", "args": "set system", "command_text": "not json"}),
            "t",
            "raw",
            user.id,
        )
        .await
        .unwrap();

    let action = wait_for_chunks(&data, ta.action_id, user.id, 1).await;
    assert_eq!(
        action.response_chunks[0].text_content.as_deref(),
        Some("config content MUST be JSON format, please retry!")
    );

    engine.shutdown().await;
}

#[tokio::test]
async fn python_verb_persists_bindings_across_separate_actions() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let data = Arc::new(data);
    let user = common::make_user(&data, "sys-python").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let home = std::env::temp_dir().join(format!("webcli-test-{}", user.id));

    let engine = make_engine(data.clone(), home);
    engine.startup().await;

    let first = engine
        .create_thread_action(thread.id, json!({"type": "python", "command_text": "x=41"}), "t", "raw", user.id)
        .await
        .unwrap();
    wait_for_chunks(&data, first.action_id, user.id, 0).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = engine
        .create_thread_action(
            thread.id,
            json!({"type": "python", "command_text": "cli_print(str(x+1))"}),
            "t",
            "raw",
            user.id,
        )
        .await
        .unwrap();

    let action = wait_for_chunks(&data, second.action_id, user.id, 1).await;
    assert_eq!(action.response_chunks[0].text_content.as_deref(), Some("42"));

    engine.shutdown().await;
}
