#![allow(dead_code)]

use axum_test::TestServer;
use fake::{faker::internet::en::SafeEmail, Fake};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use cowork_booking::{
    app,
    config::Config,
    models::WorkspaceType,
    store::{memory::WorkspaceSeed, MemoryStore, Store},
    AppState,
};

pub const OWNER_EMAIL: &str = "owner@cowork.test";

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "integration-secret"),
        ("BCRYPT_COST", "4"),
        ("OWNER_EMAIL", OWNER_EMAIL),
        ("ENVIRONMENT", "test"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn add_workspace(&self, name: &str, kind: WorkspaceType, price_per_hour: i64) -> i64 {
        self.store
            .add_workspace(WorkspaceSeed::new(name, kind, price_per_hour))
            .await
    }

    /// Входит новым пользователем со случайным email, возвращает токен.
    pub async fn login_random(&self) -> String {
        let email: String = SafeEmail().fake();
        self.login(&email, "secret-pass").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password, "name": "Орлова Мария" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn deposit(&self, token: &str, amount: i64) {
        self.server
            .post("/api/transactions")
            .authorization_bearer(token)
            .json(&json!({ "type": "deposit", "amount": amount, "description": "Пополнение" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    pub async fn balance(&self, token: &str) -> i64 {
        let response = self
            .server
            .get("/api/transactions/balance")
            .authorization_bearer(token)
            .await;
        response.assert_status_ok();
        response.json::<i64>()
    }
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let dynamic: Arc<dyn Store> = store.clone();
    let state = AppState::with_store(test_config(), Some(dynamic));
    let server = TestServer::new(app(state.clone())).unwrap();
    TestApp { server, store, state }
}

/// Приложение без базы данных.
pub fn spawn_degraded_app() -> (TestServer, Arc<AppState>) {
    let state = AppState::with_store(test_config(), None);
    let server = TestServer::new(app(state.clone())).unwrap();
    (server, state)
}
