//! Shared scaffolding for the integration suite: every test here needs a
//! real Postgres reachable via `DATABASE_URL`, consistent with the runtime
//! (non-macro) `sqlx` API used throughout `webcli_core::db` — there is no
//! compile-time `.sqlx` cache to fall back on, so tests that can't reach a
//! database skip themselves rather than fail the run.

use webcli_core::db::DataAccessor;
use webcli_core::domain::User;

/// Connects and migrates against `DATABASE_URL`, or returns `None` if it
/// isn't set so the suite stays runnable in environments without Postgres.
pub async fn connect() -> Option<DataAccessor> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let data = DataAccessor::connect(&url).await.expect("failed to connect to DATABASE_URL");
    data.migrate().await.expect("failed to run migrations");
    Some(data)
}

/// Inserts a throwaway user with a unique email so parallel tests don't collide.
pub async fn make_user(data: &DataAccessor, label: &str) -> User {
    let email = format!("{label}-{}@example.test", uuid::Uuid::new_v4());
    data.create_user(&email, "not-a-real-hash").await.expect("failed to create test user")
}
