//! Store tests against a live PostgreSQL.
//!
//! Run with `cargo test -- --ignored` and the `DB_*` variables pointing at a
//! scratch database. The unreachable-store test runs without one.

use visit_tracker::config::{loader::apply_env, AppConfig};
use std::cmp::Ordering;

use visit_tracker::store::memory::newest_first;
use visit_tracker::store::{NewUser, NewVisit, PgStore, Store, StoreError};

fn store() -> PgStore {
    let config = apply_env(AppConfig::default(), |name| std::env::var(name).ok())
        .expect("invalid DB_* environment");
    PgStore::new(&config.database)
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_schema_is_idempotent() {
    let store = store();
    store.ping().await.unwrap();
    store.init_schema().await.unwrap();
    store.init_schema().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_unique_violation_is_conflict() {
    let store = store();
    store.init_schema().await.unwrap();

    let username = unique("user");
    let user = NewUser {
        username: username.clone(),
        email: format!("{}@example.com", username),
    };
    let created = store.create_user(&user).await.unwrap();
    assert_eq!(created.username, username);
    assert!(created.created_at.is_some());

    let again = NewUser {
        username: username.clone(),
        email: format!("other-{}@example.com", username),
    };
    assert!(matches!(
        store.create_user(&again).await,
        Err(StoreError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_counts_follow_inserts() {
    let store = store();
    store.init_schema().await.unwrap();

    let before = store.stats().await.unwrap();
    store
        .record_visit(&NewVisit {
            ip_address: "192.0.2.1".into(),
            user_agent: "postgres-test".into(),
        })
        .await
        .unwrap();
    let username = unique("counted");
    store
        .create_user(&NewUser {
            email: format!("{}@example.com", username),
            username,
        })
        .await
        .unwrap();
    let after = store.stats().await.unwrap();

    // Other writers may share the database, so only a lower bound holds.
    assert!(after.visits >= before.visits + 1);
    assert!(after.users >= before.users + 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_users_ordered_by_creation_desc() {
    let store = store();
    store.init_schema().await.unwrap();

    let users = store.list_users().await.unwrap();
    assert!(users
        .windows(2)
        .all(|w| newest_first(&w[0].created_at, &w[1].created_at) != Ordering::Greater));
}

#[tokio::test]
async fn test_unreachable_store_is_connection_error() {
    let mut config = AppConfig::default();
    config.database.host = "127.0.0.1".into();
    config.database.port = 1;
    let store = PgStore::new(&config.database);
    assert!(matches!(store.ping().await, Err(StoreError::Connection(_))));
}
