//! Bearer-token round trip against a real RS256 keypair and a real user
//! row. Requires `DATABASE_URL`; skips otherwise.

mod common;

use webcli_core::auth::{generate_token, user_from_token, TokenKeys};

fn test_keys() -> TokenKeys {
    let private = include_bytes!("fixtures/test_jwt_private.pem");
    let public = include_bytes!("fixtures/test_jwt_public.pem");
    TokenKeys::from_pem(private, public).expect("test fixture keys must parse")
}

#[tokio::test]
async fn token_round_trips_to_the_issuing_user() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "token").await;
    let keys = test_keys();

    let token = generate_token(&user, &keys).unwrap();
    let resolved = user_from_token(&token, &keys, &data).await.unwrap();

    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.email, user.email);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "tamper").await;
    let keys = test_keys();

    let mut token = generate_token(&user, &keys).unwrap();
    token.push('x');

    let result = user_from_token(&token, &keys, &data).await;
    assert!(matches!(result, Err(webcli_core::error::CoreError::InvalidToken)));
}

#[tokio::test]
async fn token_for_a_deleted_user_surfaces_as_object_not_found() {
    let Some(data) = common::connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let user = common::make_user(&data, "vanished").await;
    let keys = test_keys();
    let token = generate_token(&user, &keys).unwrap();

    // Directly remove the user row without going through the accessor
    // (there's no `delete_user` in the public API, so this exercises the
    // "valid signature, stale subject" path the accessor would see from a
    // genuinely deactivated account).
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(data.pool())
        .await
        .unwrap();

    let result = user_from_token(&token, &keys, &data).await;
    assert!(result.as_ref().err().map(|e| e.is_not_found()).unwrap_or(false));
}
