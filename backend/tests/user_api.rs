//! User management endpoints through the HTTP router

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};

use common::*;
use course_manager_server::models::UserRole;

fn request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn non_admins_are_forbidden() {
    let app = TestApp::new();
    let uma = app.add_user("uma", UserRole::User).await;
    app.add_user("ed", UserRole::Editor).await;

    for username in ["uma", "ed"] {
        let (token, _) = app.session(username).await;

        let response = app.send(request(Method::GET, "/api/users", &token, None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let uri = format!("/api/users/{}", uma.id);
        let response = app
            .send(request(
                Method::PUT,
                &uri,
                &token,
                Some(json!({ "role": "admin" })),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = app
        .send(
            Request::builder()
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_creates_lists_and_reads_users() {
    let app = TestApp::new();
    app.add_user("root", UserRole::Admin).await;
    let (admin, _) = app.session("root").await;

    let response = app
        .send(request(
            Method::POST,
            "/api/users",
            &admin,
            Some(json!({
                "username": "bob",
                "password": "builder-pass",
                "firstName": "Bob",
                "lastName": "Builder",
                "role": "editor"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bob = json_body(response).await;
    assert_eq!(bob["role"], "editor");
    assert_eq!(bob["isActive"], true);
    assert!(bob.get("passwordHash").is_none());
    assert!(bob.get("refreshTokenHash").is_none());

    // The new account can log in straight away
    let response = app.login("bob", "builder-pass").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(request(Method::GET, "/api/users?role=editor", &admin, None))
        .await;
    let editors = json_body(response).await;
    assert_eq!(editors.as_array().unwrap().len(), 1);
    assert_eq!(editors[0]["username"], "bob");

    let response = app
        .send(request(Method::GET, "/api/users", &admin, None))
        .await;
    let raw = json_body(response).await.to_string();
    assert!(raw.contains("\"root\""));
    assert!(!raw.contains("passwordHash"));

    let uri = format!("/api/users/{}", bob["id"].as_str().unwrap());
    let response = app.send(request(Method::GET, &uri, &admin, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, bob);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let app = TestApp::new();
    app.add_user("root", UserRole::Admin).await;
    let (admin, _) = app.session("root").await;

    let response = app
        .send(request(
            Method::POST,
            "/api/users",
            &admin,
            Some(json!({
                "username": "root",
                "password": "another-pass",
                "firstName": "Dup",
                "lastName": "Licate"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn disabling_a_user_blocks_login_and_refresh() {
    let app = TestApp::new();
    app.add_user("root", UserRole::Admin).await;
    let alice = app.add_user("alice", UserRole::User).await;
    let (admin, _) = app.session("root").await;
    let (_, alice_cookie) = app.session("alice").await;

    let uri = format!("/api/users/{}", alice.id);
    let response = app
        .send(request(
            Method::PUT,
            &uri,
            &admin,
            Some(json!({ "isActive": false })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["isActive"], false);

    let response = app.login("alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Account is disabled");

    // The existing session ended with the account
    let response = app.refresh(Some(&alice_cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(request(
            Method::PUT,
            &uri,
            &admin,
            Some(json!({ "isActive": true })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.login("alice", PASSWORD).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_deletes_others_but_not_themselves() {
    let app = TestApp::new();
    let root = app.add_user("root", UserRole::Admin).await;
    let bob = app.add_user("bob", UserRole::User).await;
    let (admin, _) = app.session("root").await;

    let own = format!("/api/users/{}", root.id);
    let response = app.send(request(Method::DELETE, &own, &admin, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/users/{}", bob.id);
    let response = app.send(request(Method::DELETE, &uri, &admin, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!(bob.id.to_string()));

    let response = app.send(request(Method::GET, &uri, &admin, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.login("bob", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_user_validates_body() {
    let app = TestApp::new();
    app.add_user("root", UserRole::Admin).await;
    let (admin, _) = app.session("root").await;

    let response = app
        .send(request(
            Method::POST,
            "/api/users",
            &admin,
            Some(json!({
                "username": "carol",
                "password": "short",
                "firstName": "Carol",
                "lastName": "Singer"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
