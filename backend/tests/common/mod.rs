//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use course_manager_server::app_state::AppState;
use course_manager_server::auth::{
    AuthService, SessionCookie, TokenCodec, TokenConfig, REFRESH_COOKIE_NAME,
};
use course_manager_server::course::CourseService;
use course_manager_server::models::{User, UserResponse, UserRole};
use course_manager_server::store::UserStore;
use course_manager_server::routes;
use course_manager_server::store::MemoryStore;
use course_manager_server::user::{NewUser, UserService};

pub const PASSWORD: &str = "s3cret-pass";
pub const ACCESS_SECRET: &str = "test-access";
pub const REFRESH_SECRET: &str = "test-refresh";

pub struct TestApp {
    pub router: Router,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth_service =
            Arc::new(AuthService::new(store.clone(), Self::codec()).with_bcrypt_cost(4));
        let user_service = Arc::new(UserService::new(store.clone()).with_bcrypt_cost(4));
        let course_service = Arc::new(CourseService::new(store.clone()));

        let state = AppState::new(
            auth_service.clone(),
            user_service.clone(),
            course_service,
            SessionCookie::new(false),
            None,
        );

        Self {
            router: routes::api_router(state),
            auth_service,
            user_service,
            store,
        }
    }

    /// Codec sharing the router's secrets, for hand-crafted tokens
    pub fn codec() -> TokenCodec {
        TokenCodec::new(TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET))
    }

    pub async fn add_user(&self, username: &str, role: UserRole) -> UserResponse {
        self.user_service
            .create(NewUser {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                first_name: username.to_uppercase(),
                last_name: "Tester".to_string(),
                role,
            })
            .await
            .expect("register user")
    }

    /// Raw stored record, secrets included
    pub async fn store_user(&self, id: uuid::Uuid) -> User {
        self.store
            .find_by_id(id)
            .await
            .expect("store lookup")
            .expect("user exists")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Log in and return (access token, refresh cookie value)
    pub async fn session(&self, username: &str) -> (String, String) {
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = refresh_cookie(&response).expect("refresh cookie set");
        let body = json_body(response).await;
        (body["token"].as_str().unwrap().to_string(), cookie)
    }

    pub async fn refresh(&self, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri("/api/auth/refresh");
        if let Some(value) = cookie {
            builder = builder.header(
                header::COOKIE,
                format!("{}={}", REFRESH_COOKIE_NAME, value),
            );
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Every `Set-Cookie` header for the refresh cookie
pub fn refresh_set_cookies(response: &Response<Body>) -> Vec<String> {
    let prefix = format!("{}=", REFRESH_COOKIE_NAME);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

/// Value of a non-empty refresh cookie set by the response
pub fn refresh_cookie(response: &Response<Body>) -> Option<String> {
    refresh_set_cookies(response).into_iter().find_map(|header| {
        let pair = header.split(';').next()?;
        let (_, value) = pair.split_once('=')?;
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Whether the response expires the refresh cookie
pub fn clears_refresh_cookie(response: &Response<Body>) -> bool {
    refresh_set_cookies(response)
        .iter()
        .any(|header| header.contains("Max-Age=0"))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
