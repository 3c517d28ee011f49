//! Exercises `DataAccessor` against a real Postgres: ownership checks,
//! dense ordering, and one-way completion. Requires `DATABASE_URL`;
//! skips otherwise.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use webcli_core::error::CoreError;

#[tokio::test]
async fn thread_owned_by_another_user_is_reported_not_found() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let owner = common::make_user(&data, "owner").await;
    let stranger = common::make_user(&data, "stranger").await;

    let thread = data.create_thread("t1", "", owner.id).await.unwrap();

    let result = data.get_thread(thread.id, stranger.id).await;
    assert!(matches!(result, Err(CoreError::ObjectNotFound { .. })));

    let result = data.patch_thread(thread.id, stranger.id, Some("new title"), None).await;
    assert!(matches!(result, Err(CoreError::ObjectNotFound { .. })));
}

#[tokio::test]
async fn appending_the_same_action_to_a_thread_twice_is_rejected() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "dup").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();

    data.append_action_to_thread(thread.id, action.id, user.id).await.unwrap();
    let second = data.append_action_to_thread(thread.id, action.id, user.id).await;

    assert!(matches!(second, Err(CoreError::ActionAlreadyInThread { .. })));
}

#[tokio::test]
async fn thread_actions_get_dense_increasing_display_order() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "order").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();

    let mut orders = Vec::new();
    for _ in 0..3 {
        let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();
        let ta = data.append_action_to_thread(thread.id, action.id, user.id).await.unwrap();
        orders.push(ta.display_order);
    }

    assert_eq!(orders, vec![1, 2, 3]);
}

#[tokio::test]
async fn completing_an_action_twice_is_rejected() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "complete").await;
    let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();

    data.complete_action(action.id, user.id).await.unwrap();
    let second = data.complete_action(action.id, user.id).await;

    assert!(matches!(second, Err(CoreError::ObjectNotFound { .. })));
}

#[tokio::test]
async fn appending_a_response_chunk_to_a_completed_action_is_rejected() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "chunk").await;
    let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();

    data.complete_action(action.id, user.id).await.unwrap();
    let result = data.append_response_to_action(action.id, "text/plain", Some("too late"), None).await;

    assert!(matches!(result, Err(CoreError::ObjectNotFound { .. })));
}

#[tokio::test]
async fn response_chunks_get_dense_increasing_order() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "chunkorder").await;
    let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();

    let c1 = data.append_response_to_action(action.id, "text/plain", Some("a"), None).await.unwrap();
    let c2 = data.append_response_to_action(action.id, "text/plain", Some("b"), None).await.unwrap();

    assert_eq!(c1.order, 1);
    assert_eq!(c2.order, 2);

    let hydrated = data.get_action(action.id, user.id).await.unwrap();
    assert_eq!(hydrated.response_chunks.len(), 2);
    assert_eq!(hydrated.response_chunks[0].text_content.as_deref(), Some("a"));
}

#[tokio::test]
async fn unconfigured_handler_returns_empty_object_not_an_error() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "config").await;
    let config = data.get_action_handler_user_config("system", user.id).await.unwrap();

    assert_eq!(config.configuration, json!({}));
}

#[tokio::test]
async fn setting_handler_config_twice_upserts() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "upsert").await;

    data.set_action_handler_user_config("system", user.id, &json!({"a": 1})).await.unwrap();
    data.set_action_handler_user_config("system", user.id, &json!({"a": 2})).await.unwrap();

    let config = data.get_action_handler_user_config("system", user.id).await.unwrap();
    assert_eq!(config.configuration, json!({"a": 2}));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let email = format!("dup-{}@example.test", uuid::Uuid::new_v4());
    data.create_user(&email, "hash-one").await.unwrap();
    let result = data.create_user(&email, "hash-two").await;

    assert!(matches!(result, Err(CoreError::DuplicateUserEmail(_))));
}

#[tokio::test]
async fn deleting_a_thread_does_not_delete_its_actions() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "delete").await;
    let thread = data.create_thread("t1", "", user.id).await.unwrap();
    let action = data.create_action("system", &json!({"type": "markdown"}), "title", "raw", user.id).await.unwrap();
    data.append_action_to_thread(thread.id, action.id, user.id).await.unwrap();

    data.delete_thread(thread.id, user.id).await.unwrap();

    let still_there = data.get_action(action.id, user.id).await;
    assert!(still_there.is_ok());
}
