//! Shared helpers for integration suites that need PostgreSQL.
//!
//! Suites read `TEST_DATABASE_URL`; when it is unset they print a skip
//! marker and return early, so the default `cargo test` run needs no
//! database.

use diesel::sql_types::{Nullable, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use realscape::domain::PropertyId;
use realscape::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use uuid::Uuid;

pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// Migrated pool for `TEST_DATABASE_URL`, or `None` to skip.
pub async fn test_pool() -> Option<DbPool> {
    let Some(url) = std::env::var(TEST_DATABASE_URL)
        .ok()
        .filter(|url| !url.trim().is_empty())
    else {
        eprintln!("SKIP-TEST-DATABASE: {TEST_DATABASE_URL} is not set");
        return None;
    };
    run_pending_migrations(&url)
        .await
        .expect("migrations apply against the test database");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(8))
        .await
        .expect("test database pool");
    Some(pool)
}

/// Insert a verified listing, optionally owned by `owner`.
pub async fn insert_property(pool: &DbPool, owner: Option<&str>) -> PropertyId {
    let id = Uuid::new_v4();
    let mut conn = pool.get().await.expect("test connection");
    diesel::sql_query(
        "INSERT INTO properties (id, verification, owner_email) VALUES ($1, 'verified', $2)",
    )
    .bind::<SqlUuid, _>(id)
    .bind::<Nullable<Text>, _>(owner)
    .execute(&mut conn)
    .await
    .expect("insert test property");
    PropertyId::from_uuid(id)
}

/// A unique email so suites sharing one database never collide.
pub fn unique_email(label: &str) -> String {
    format!("{label}-{}@example.com", Uuid::new_v4().simple())
}
