mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;
use cowork_booking::models::WorkspaceType;
use cowork_booking::store::memory::WorkspaceSeed;

#[tokio::test]
async fn test_workspaces_filter_by_type_and_search() {
    let app = spawn_app();
    app.store
        .add_workspace(
            WorkspaceSeed::new("Кресло у окна", WorkspaceType::Hairdresser, 800)
                .description("Светлое место с видом на парк"),
        )
        .await;
    app.add_workspace("Маникюрный стол", WorkspaceType::Manicure, 300).await;
    app.add_workspace("Маникюрный стол VIP", WorkspaceType::Manicure, 500).await;

    let all: Vec<Value> = app.server.get("/api/workspaces").await.json();
    assert_eq!(all.len(), 3);

    let manicure: Vec<Value> = app
        .server
        .get("/api/workspaces")
        .add_query_param("type", "manicure")
        .await
        .json();
    assert_eq!(manicure.len(), 2);
    assert!(manicure.iter().all(|w| w["type"] == "manicure"));

    let by_description: Vec<Value> = app
        .server
        .get("/api/workspaces")
        .add_query_param("search", "ПАРК")
        .await
        .json();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0]["name"], "Кресло у окна");

    let combined: Vec<Value> = app
        .server
        .get("/api/workspaces")
        .add_query_param("type", "manicure")
        .add_query_param("search", "vip")
        .await
        .json();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0]["pricePerHour"], 500);
}

#[tokio::test]
async fn test_workspace_by_id() {
    let app = spawn_app();
    let id = app.add_workspace("Кабинет массажа", WorkspaceType::Massage, 1200).await;

    let response = app.server.get(&format!("/api/workspaces/{}", id)).await;
    response.assert_status_ok();
    let workspace: Value = response.json();
    assert_eq!(workspace["name"], "Кабинет массажа");
    assert_eq!(workspace["rating"], 0.0);
    assert_eq!(workspace["amenities"], json!([]));

    app.server
        .get("/api/workspaces/9999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reviews_update_workspace_rating() {
    let app = spawn_app();
    let workspace = app.add_workspace("Кресло у окна", WorkspaceType::Hairdresser, 800).await;
    let token = app.login_random().await;

    for (rating, comment) in [(5, "Отлично"), (4, "Хорошо")] {
        let response = app
            .server
            .post("/api/reviews")
            .authorization_bearer(&token)
            .json(&json!({ "workspaceId": workspace, "rating": rating, "comment": comment }))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert!(response.json::<Value>()["id"].is_i64());
    }

    let detail: Value = app
        .server
        .get(&format!("/api/workspaces/{}", workspace))
        .await
        .json();
    assert_eq!(detail["rating"], 4.5);
    assert_eq!(detail["reviewCount"], 2);

    let reviews: Vec<Value> = app
        .server
        .get("/api/reviews")
        .add_query_param("workspaceId", workspace)
        .await
        .json();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["comment"], "Хорошо");
    assert_eq!(reviews[0]["userName"], "Орлова Мария");
}

#[tokio::test]
async fn test_review_rating_out_of_range_is_rejected() {
    let app = spawn_app();
    let workspace = app.add_workspace("Кресло у окна", WorkspaceType::Hairdresser, 800).await;
    let token = app.login_random().await;

    for rating in [0, 6] {
        app.server
            .post("/api/reviews")
            .authorization_bearer(&token)
            .json(&json!({ "workspaceId": workspace, "rating": rating }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let detail: Value = app
        .server
        .get(&format!("/api/workspaces/{}", workspace))
        .await
        .json();
    assert_eq!(detail["reviewCount"], 0);
}

#[tokio::test]
async fn test_review_for_unknown_workspace_is_not_found() {
    let app = spawn_app();
    let token = app.login_random().await;

    app.server
        .post("/api/reviews")
        .authorization_bearer(&token)
        .json(&json!({ "workspaceId": 77, "rating": 5 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_with_foreign_booking_is_not_found() {
    let app = spawn_app();
    let workspace = app.add_workspace("Кресло у окна", WorkspaceType::Hairdresser, 800).await;
    let owner = app.login("owner-of-booking@cowork.test", "secret-pass").await;
    let stranger = app.login("stranger@cowork.test", "secret-pass").await;
    app.deposit(&owner, 800).await;

    let receipt: Value = app
        .server
        .post("/api/bookings")
        .authorization_bearer(&owner)
        .json(&json!({
            "workspaceId": workspace,
            "startTime": "2025-03-14T10:00:00Z",
            "endTime": "2025-03-14T11:00:00Z"
        }))
        .await
        .json();
    let booking_id = receipt["id"].as_i64().unwrap();

    for (token, booking) in [(&stranger, booking_id), (&owner, 9999)] {
        let response = app
            .server
            .post("/api/reviews")
            .authorization_bearer(token)
            .json(&json!({ "workspaceId": workspace, "bookingId": booking, "rating": 5 }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    app.server
        .post("/api/reviews")
        .authorization_bearer(&owner)
        .json(&json!({ "workspaceId": workspace, "bookingId": booking_id, "rating": 5 }))
        .await
        .assert_status(StatusCode::CREATED);
}
