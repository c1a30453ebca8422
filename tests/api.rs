//! End-to-end tests over HTTP against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde_json::{json, Value};
use visit_tracker::MemoryStore;

mod common;

use common::TestServer;

async fn create(server: &TestServer, username: &str, email: &str) -> reqwest::Response {
    server
        .client
        .post(server.url("/api/users"))
        .json(&json!({ "username": username, "email": email }))
        .send()
        .await
        .expect("server unreachable")
}

async fn stats(server: &TestServer) -> Value {
    server
        .client
        .get(server.url("/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_tracks_store() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    store.set_available(false);
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_user_registration_and_conflicts() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let res = create(&server, "ada", "ada@example.com").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: Value = res.json().await.unwrap();
    assert!(user["id"].is_i64());
    assert_eq!(user["username"], "ada");
    assert_eq!(user["email"], "ada@example.com");
    assert!(user["created_at"].is_string());

    let res = create(&server, "ada", "someone-else@example.com").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = create(&server, "not-ada", "ada@example.com").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "User already exists");

    assert_eq!(stats(&server).await["users"], 1);
}

#[tokio::test]
async fn test_missing_fields_create_nothing() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    for body in [
        json!({ "username": "ada" }),
        json!({ "email": "ada@example.com" }),
        json!({ "username": "", "email": "ada@example.com" }),
        json!({}),
    ] {
        let res = server
            .client
            .post(server.url("/api/users"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    assert_eq!(stats(&server).await["users"], 0);
}

#[tokio::test]
async fn test_users_listed_newest_first() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    for i in 0..4 {
        let res = create(&server, &format!("user{}", i), &format!("user{}@example.com", i)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let body: Value = server
        .client
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["count"], 4);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 4);
    assert_eq!(users[0]["username"], "user3");

    let times: Vec<NaiveDateTime> = users
        .iter()
        .map(|u| {
            NaiveDateTime::parse_from_str(u["created_at"].as_str().unwrap(), "%Y-%m-%dT%H:%M:%S%.f")
                .unwrap()
        })
        .collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_concurrent_visits_each_recorded() {
    let store = Arc::new(MemoryStore::new());
    let server = Arc::new(TestServer::start(store.clone()).await);

    let mut tasks = Vec::new();
    for _ in 0..25 {
        let server = server.clone();
        tasks.push(tokio::spawn(async move {
            server
                .client
                .get(server.url("/"))
                .header("user-agent", "load-test")
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(store.visits().len(), 25);
    assert!(store
        .visits()
        .iter()
        .all(|v| v.ip_address.as_deref() == Some("127.0.0.1")));

    let counts = stats(&server).await;
    assert_eq!(counts["visits"], 25);
    assert_eq!(counts["users"], 0);
}

#[tokio::test]
async fn test_visit_failure_still_welcomes() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;
    store.set_available(false);

    let res = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Welcome to Multi-Tier AWS Application");
    assert_eq!(body["note"], "Database logging temporarily unavailable");

    let res = server.client.get(server.url("/api/stats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    store.set_available(true);
    assert_eq!(stats(&server).await["visits"], 0);
}
