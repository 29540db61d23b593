//! Router-level tests for the auth and validation paths. These requests are
//! rejected before any query runs, so a lazily-connected pool is enough and
//! no database is needed.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use reliefnet::{create_router, models::Role, utils::create_token};

fn test_app() -> Router {
    std::env::set_var("JWT_SECRET", "test-secret");
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/reliefnet_test")
        .expect("lazy pool");
    create_router(db)
}

fn bearer(role: Role) -> String {
    let token = create_token(Uuid::new_v4(), "tester@example.com", role.as_str()).unwrap();
    format!("Bearer {}", token)
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (status, body) = send(test_app(), "GET", "/needs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized. No token provided");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let (status, body) = send(
        test_app(),
        "GET",
        "/dispatches",
        Some("Bearer not-a-jwt".to_string()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized. Invalid token");
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let (status, _) = send(
        test_app(),
        "GET",
        "/stock",
        Some("Basic dXNlcjpwYXNz".to_string()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_need_rejects_short_description() {
    let body = json!({
        "type": "water",
        "description": "too short",
        "urgency": "high",
        "location": { "lat": 27.7, "lng": 85.3 }
    });
    let (status, body) = send(
        test_app(),
        "POST",
        "/needs",
        Some(bearer(Role::Individual)),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Description must be between 10 and 500 characters"
    );
}

#[tokio::test]
async fn create_need_rejects_out_of_range_latitude() {
    let body = json!({
        "type": "food",
        "description": "Cooked meals for a stranded group of twelve",
        "urgency": "medium",
        "location": { "lat": 95.0, "lng": 85.3 }
    });
    let (status, body) = send(
        test_app(),
        "POST",
        "/needs",
        Some(bearer(Role::Individual)),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude must be between -90 and 90");
}

#[tokio::test]
async fn list_needs_rejects_unknown_status_filter() {
    let (status, body) = send(
        test_app(),
        "GET",
        "/needs?status=finished",
        Some(bearer(Role::Worker)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status filter");
}

#[tokio::test]
async fn fulfill_rejects_zero_quantity() {
    let uri = format!("/needs/{}/fulfill", Uuid::new_v4());
    let (status, body) = send(
        test_app(),
        "PATCH",
        &uri,
        Some(bearer(Role::Worker)),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be greater than zero");
}

#[tokio::test]
async fn dispatch_rejects_zero_eta() {
    let uri = format!("/needs/{}/dispatch", Uuid::new_v4());
    let (status, body) = send(
        test_app(),
        "POST",
        &uri,
        Some(bearer(Role::Worker)),
        Some(json!({ "eta": 0, "resource_amount": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ETA must be at least 1 minute");
}

#[tokio::test]
async fn dispatch_rejects_zero_amount() {
    let uri = format!("/needs/{}/dispatch", Uuid::new_v4());
    let (status, _) = send(
        test_app(),
        "POST",
        &uri,
        Some(bearer(Role::Admin)),
        Some(json!({ "eta": 30, "resource_amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dispatch_status_update_rejects_unknown_status() {
    let uri = format!("/dispatches/{}", Uuid::new_v4());
    let (status, body) = send(
        test_app(),
        "PATCH",
        &uri,
        Some(bearer(Role::Admin)),
        Some(json!({ "status": "lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");
}

#[tokio::test]
async fn dispatch_status_update_rejects_dispatched() {
    // Only reached and cancelled are reachable through this route.
    let uri = format!("/dispatches/{}", Uuid::new_v4());
    let (status, _) = send(
        test_app(),
        "PATCH",
        &uri,
        Some(bearer(Role::Admin)),
        Some(json!({ "status": "dispatched" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn restock_rejects_zero_quantity() {
    let (status, body) = send(
        test_app(),
        "POST",
        "/stock",
        Some(bearer(Role::Admin)),
        Some(json!({ "type": "food", "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be at least 1");
}

#[tokio::test]
async fn set_stock_rejects_negative_quantity() {
    let (status, _) = send(
        test_app(),
        "PATCH",
        "/stock",
        Some(bearer(Role::Admin)),
        Some(json!({ "type": "water", "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_reject_non_admin_callers() {
    let (status, body) = send(
        test_app(),
        "GET",
        "/admin/users",
        Some(bearer(Role::Worker)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized. Admin access required");

    let uri = format!("/admin/users/{}", Uuid::new_v4());
    let (status, _) = send(
        test_app(),
        "DELETE",
        &uri,
        Some(bearer(Role::Individual)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_invalid_email() {
    let (status, body) = send(
        test_app(),
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "pw", "role": "individual" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A valid email is required");
}

#[tokio::test]
async fn signup_rejects_empty_password() {
    let (status, _) = send(
        test_app(),
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "a@example.com", "password": "", "role": "worker" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
