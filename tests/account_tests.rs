mod common;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{json, Value};

use common::{spawn_app, spawn_degraded_app, OWNER_EMAIL};
use cowork_booking::models::{RewardStatus, User, UserRole};

#[tokio::test]
async fn test_health() {
    let app = spawn_app();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_login_creates_user_and_checks_password() {
    let app = spawn_app();
    let token = app.login("Master@Cowork.test", "secret-pass").await;

    let me: Value = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(me["email"], "master@cowork.test");
    assert_eq!(me["role"], "user");

    // Повторный вход с тем же паролем
    app.login("master@cowork.test", "secret-pass").await;

    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "master@cowork.test", "password": "wrong" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "not-an-email", "password": "secret-pass" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_and_logout() {
    let app = spawn_app();
    let token = app.login("profile@cowork.test", "secret-pass").await;

    let profile: Value = app
        .server
        .get("/api/users/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["email"], "profile@cowork.test");
    assert_eq!(profile["name"], "Орлова Мария");
    assert_eq!(profile["points"], 0);
    assert_eq!(profile["status"], "bronze");

    let logout: Value = app.server.post("/api/auth/logout").await.json();
    assert_eq!(logout["success"], true);
}

#[tokio::test]
async fn test_transaction_sign_must_match_type() {
    let app = spawn_app();
    let token = app.login_random().await;

    for body in [
        json!({ "type": "deposit", "amount": -100 }),
        json!({ "type": "refund", "amount": 0 }),
        json!({ "type": "withdrawal", "amount": 100 }),
        json!({ "type": "payment", "amount": 50 }),
    ] {
        app.server
            .post("/api/transactions")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_withdrawal_is_limited_by_balance() {
    let app = spawn_app();
    let token = app.login_random().await;
    app.deposit(&token, 1000).await;

    app.server
        .post("/api/transactions")
        .authorization_bearer(&token)
        .json(&json!({ "type": "withdrawal", "amount": -1500 }))
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);

    app.server
        .post("/api/transactions")
        .authorization_bearer(&token)
        .json(&json!({ "type": "withdrawal", "amount": -400 }))
        .await
        .assert_status(StatusCode::CREATED);

    app.server
        .post("/api/transactions")
        .authorization_bearer(&token)
        .json(&json!({ "type": "refund", "amount": 150 }))
        .await
        .assert_status(StatusCode::CREATED);

    assert_eq!(app.balance(&token).await, 750);
    let transactions: Vec<Value> = app
        .server
        .get("/api/transactions")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(transactions.len(), 3);
    assert_eq!(transactions[0]["type"], "refund");
    assert_eq!(transactions[0]["status"], "completed");
}

#[tokio::test]
async fn test_sql_logs_are_admin_only() {
    let app = spawn_app();
    let user = app.login_random().await;
    let admin = app.login(OWNER_EMAIL, "owner-pass").await;

    let me: Value = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(me["role"], "admin");

    app.server
        .get("/api/logs/sql")
        .authorization_bearer(&user)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.deposit(&user, 300).await;

    let response = app
        .server
        .get("/api/logs/sql")
        .authorization_bearer(&admin)
        .add_query_param("limit", 5)
        .await;
    response.assert_status_ok();
    let logs: Vec<Value> = response.json();
    assert!(!logs.is_empty() && logs.len() <= 5);
    // Последняя операция идёт первой
    assert_eq!(logs[0]["endpoint"], "transactions.create");
    assert_eq!(logs[0]["operation"], "INSERT");
    assert!(logs[0]["userId"].is_i64());

    app.server
        .get("/api/logs/sql")
        .authorization_bearer(&admin)
        .add_query_param("limit", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

fn offline_user() -> User {
    let now = Utc::now();
    User {
        id: 1,
        email: "offline@cowork.test".to_string(),
        name: None,
        password_hash: None,
        login_method: Some("password".to_string()),
        role: UserRole::User,
        phone: None,
        avatar: None,
        bio: None,
        specialization: None,
        points: 0,
        status: RewardStatus::Bronze,
        created_at: now,
        updated_at: now,
        last_signed_in: now,
    }
}

#[tokio::test]
async fn test_without_database_reads_are_empty_and_writes_fail() {
    let (server, state) = spawn_degraded_app();
    let token = state.tokens.issue(&offline_user()).unwrap();

    let workspaces: Vec<Value> = server.get("/api/workspaces").await.json();
    assert!(workspaces.is_empty());

    server
        .get("/api/workspaces/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let balance: i64 = server
        .get("/api/transactions/balance")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(balance, 0);

    let stats: Value = server
        .get("/api/stats")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(stats["totalBookings"], 0);

    let response = server
        .post("/api/bookings")
        .authorization_bearer(&token)
        .json(&json!({
            "workspaceId": 1,
            "startTime": "2025-03-14T10:00:00Z",
            "endTime": "2025-03-14T11:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["message"], "База данных недоступна");

    server
        .post("/api/transactions")
        .authorization_bearer(&token)
        .json(&json!({ "type": "deposit", "amount": 100 }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "offline@cowork.test", "password": "secret-pass" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_extreme_amounts_are_rejected() {
    let app = spawn_app();
    let token = app.login_random().await;
    app.deposit(&token, 100).await;

    for body in [
        json!({ "type": "withdrawal", "amount": i64::MIN }),
        json!({ "type": "deposit", "amount": i64::MAX }),
        json!({ "type": "deposit", "amount": 1_000_000_000_001i64 }),
    ] {
        app.server
            .post("/api/transactions")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    app.deposit(&token, 1_000_000_000_000).await;
    assert_eq!(app.balance(&token).await, 1_000_000_000_100);
    assert_eq!(app.store.transaction_count().await, 2);
}

#[tokio::test]
async fn test_stats_and_catalog_are_logged_under_their_own_names() {
    let app = spawn_app();
    let user = app.login_random().await;
    let admin = app.login(OWNER_EMAIL, "owner-pass").await;

    app.server
        .get("/api/stats")
        .authorization_bearer(&user)
        .await
        .assert_status_ok();

    let logs: Vec<Value> = app
        .server
        .get("/api/logs/sql")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(logs[0]["endpoint"], "stats.getUserStats");
    assert_eq!(logs[0]["operation"], "SELECT");
    assert!(!logs
        .iter()
        .any(|l| l["endpoint"] == "bookings.getUserBookings"
            || l["endpoint"] == "transactions.getUserBalance"));

    app.server
        .get("/api/workspaces")
        .add_query_param("type", "manicure")
        .add_query_param("search", "VIP")
        .await
        .assert_status_ok();

    let logs: Vec<Value> = app
        .server
        .get("/api/logs/sql")
        .authorization_bearer(&admin)
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["endpoint"], "workspaces.getAll");
    let query = logs[0]["query"].as_str().unwrap();
    assert!(query.contains("type = 'manicure'"));
    assert!(query.contains("ILIKE '%vip%'"));
    assert!(logs[0]["userId"].is_null());
}
