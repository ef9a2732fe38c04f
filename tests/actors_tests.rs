//! Integration tests for actor endpoints.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn test_list_actors_unauthenticated() {
    let app = TestApp::new().await;

    let response = app.server().get("/api/actors").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_list_actors() {
    let app = TestApp::new().await;
    let (_user_id, token) = app.create_user().await;
    let (name, value) = app.auth_header(&token);

    app.create_actor("Actor 1").await;
    app.create_actor("Actor 2").await;

    let response = app.server().get("/api/actors").add_header(name, value).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let actors = body.as_array().expect("Response should be an array");
    assert_eq!(actors.len(), 2);
    assert_eq!(actors[0]["name"], "Actor 1");
    assert_eq!(actors[1]["name"], "Actor 2");
}

#[tokio::test]
async fn test_create_actor_as_staff() {
    let app = TestApp::new().await;
    let (_staff_id, token) = app.create_staff().await;
    let (name, value) = app.auth_header(&token);

    let response = app
        .server()
        .post("/api/actors")
        .add_header(name, value)
        .json(&serde_json::json!({"name": "New Actor"}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert!(body.get("id").is_some());
    assert_eq!(body["name"], "New Actor");
}

#[tokio::test]
async fn test_create_actor_forbidden() {
    let app = TestApp::new().await;
    let (_user_id, token) = app.create_user().await;
    let (name, value) = app.auth_header(&token);

    let response = app
        .server()
        .post("/api/actors")
        .add_header(name, value)
        .json(&serde_json::json!({"name": "New Actor"}))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_create_actor_empty_name() {
    let app = TestApp::new().await;
    let (_staff_id, token) = app.create_staff().await;
    let (name, value) = app.auth_header(&token);

    let response = app
        .server()
        .post("/api/actors")
        .add_header(name, value)
        .json(&serde_json::json!({"name": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_same_actor_name_allowed_twice() {
    let app = TestApp::new().await;
    let (_staff_id, token) = app.create_staff().await;
    let (name, value) = app.auth_header(&token);

    let first = app
        .server()
        .post("/api/actors")
        .add_header(name.clone(), value.clone())
        .json(&serde_json::json!({"name": "John Smith"}))
        .await;
    first.assert_status(StatusCode::CREATED);

    let second = app
        .server()
        .post("/api/actors")
        .add_header(name, value)
        .json(&serde_json::json!({"name": "John Smith"}))
        .await;
    second.assert_status(StatusCode::CREATED);

    let first_body: serde_json::Value = first.json();
    let second_body: serde_json::Value = second.json();
    assert_ne!(first_body["id"], second_body["id"]);
}
