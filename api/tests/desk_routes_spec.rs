//! Integration tests for the desk registry routes.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use booking::clock::FixedClock;
use booking::Store;
use grants::{Evaluator, GrantCfg, GrantsConfig};
use roost_api::auth::{Claims, JwtConfig};
use roost_api::{create_app, AppState};

const SECRET: &str = "roost-test-secret";

fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 4, 18, 9, 0, 0).unwrap()
}

fn test_app() -> Router {
    let grants = GrantsConfig::default().with_role(
        "facilities",
        vec![
            GrantCfg::new("admin/", "desk"),
            GrantCfg::new("admin/", "desk_reservation"),
        ],
    );
    let state = AppState::with_parts(
        Store::open_in_memory().unwrap(),
        Arc::new(Evaluator::new(grants)),
        Arc::new(FixedClock(base_now())),
        JwtConfig::new(SECRET.to_string(), Algorithm::HS256),
    );
    create_app(state)
}

fn token_for(actor_id: i64, handle: &str, roles: &[&str]) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: actor_id.to_string(),
        exp: (now + 3600) as usize,
        iat: Some(now as usize),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        handle: Some(handle.to_string()),
        name: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_desk(app: &Router, token: &str, tag: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/desk/admin/create",
        Some(token),
        Some(json!({ "tag": tag, "desk_type": "Computer Desk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "seeding desk '{tag}' failed: {body}");
    body
}

#[tokio::test]
async fn given_admin_grant_when_desk_created_then_returns_desk_with_id() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/api/desk/admin/create",
        Some(&admin),
        Some(json!({
            "tag": "CD1",
            "desk_type": "Computer Desk",
            "included_resource": "Desktop Computer"
        })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "CD1");
    assert_eq!(body["available"], true);
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn given_no_admin_grant_when_desk_created_then_returns_403() {
    // Arrange
    let app = test_app();
    let student = token_for(7, "amara", &["student"]);

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/api/desk/admin/create",
        Some(&student),
        Some(json!({ "tag": "CD1", "desk_type": "Computer Desk" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("no grant"));
}

#[tokio::test]
async fn given_existing_tag_when_desk_created_again_then_returns_409() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    create_desk(&app, &admin, "CD1").await;

    // Act
    let (status, _) = send(
        &app,
        "POST",
        "/api/desk/admin/create",
        Some(&admin),
        Some(json!({ "tag": "CD1", "desk_type": "Office Desk" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn given_malformed_tag_when_desk_created_then_returns_422() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);

    // Act - embedded space is outside the tag alphabet
    let (status, _) = send(
        &app,
        "POST",
        "/api/desk/admin/create",
        Some(&admin),
        Some(json!({ "tag": "desk 1", "desk_type": "Office Desk" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn given_desk_exists_when_fetched_without_token_then_returns_desk() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    let desk = create_desk(&app, &admin, "OSD2").await;
    let desk_id = desk["id"].as_i64().unwrap();

    // Act - single-desk lookup is public
    let (status, body) = send(&app, "GET", &format!("/api/desk/{desk_id}"), None, None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "OSD2");
}

#[tokio::test]
async fn given_unknown_desk_id_when_fetched_then_returns_404() {
    // Arrange
    let app = test_app();

    // Act
    let (status, _) = send(&app, "GET", "/api/desk/999", None, None).await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_unavailable_desk_when_available_listed_then_it_is_excluded() {
    // Arrange - two desks, one toggled off
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    create_desk(&app, &admin, "CD1").await;
    let standing = create_desk(&app, &admin, "SD1").await;
    let standing_id = standing["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/desk/admin/toggle/{standing_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, body) = send(&app, "GET", "/api/desk/available", None, None).await;

    // Assert - only the still-available desk shows up
    assert_eq!(status, StatusCode::OK);
    let desks = body["desks"].as_array().unwrap();
    assert_eq!(desks.len(), 1);
    assert_eq!(desks[0]["tag"], "CD1");
}

#[tokio::test]
async fn given_full_listing_when_called_without_admin_grant_then_returns_403() {
    // Arrange
    let app = test_app();
    let student = token_for(7, "amara", &["student"]);

    // Act - the unfiltered listing is admin-only
    let (status, _) = send(&app, "GET", "/api/desk", Some(&student), None).await;

    // Assert
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_full_listing_when_called_with_admin_grant_then_includes_unavailable_desks() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    create_desk(&app, &admin, "CD1").await;
    let standing = create_desk(&app, &admin, "SD1").await;
    let standing_id = standing["id"].as_i64().unwrap();
    send(
        &app,
        "PUT",
        &format!("/api/desk/admin/toggle/{standing_id}"),
        Some(&admin),
        None,
    )
    .await;

    // Act
    let (status, body) = send(&app, "GET", "/api/desk", Some(&admin), None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["desks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn given_patch_body_when_desk_updated_then_only_named_fields_change() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    let desk = create_desk(&app, &admin, "CD1").await;
    let desk_id = desk["id"].as_i64().unwrap();

    // Act
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/desk/admin/update/{desk_id}"),
        Some(&admin),
        Some(json!({ "included_resource": "Dual Monitors" })),
    )
    .await;

    // Assert - tag and type untouched
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["included_resource"], "Dual Monitors");
    assert_eq!(body["tag"], "CD1");
    assert_eq!(body["desk_type"], "Computer Desk");
}

#[tokio::test]
async fn given_desk_with_upcoming_reservation_when_toggled_off_then_occupancy_is_cleared() {
    // Arrange - student books the desk for the next hour
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    let student = token_for(7, "amara", &["student"]);
    let desk = create_desk(&app, &admin, "CD1").await;
    let desk_id = desk["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/api/reservation/reserve",
        Some(&student),
        Some(json!({ "desk_id": desk_id, "date": "2023-04-18T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/desk/admin/toggle/{desk_id}"),
        Some(&admin),
        None,
    )
    .await;

    // Assert - desk is off and its upcoming occupancy is gone
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    let (_, occupancy) = send(
        &app,
        "GET",
        &format!("/api/reservation/{desk_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(occupancy["reservations"], json!([]));
}

#[tokio::test]
async fn given_desk_removed_then_subsequent_fetch_returns_404() {
    // Arrange
    let app = test_app();
    let admin = token_for(1, "facilities-bot", &["facilities"]);
    let desk = create_desk(&app, &admin, "CD1").await;
    let desk_id = desk["id"].as_i64().unwrap();

    // Act
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/desk/admin/{desk_id}"),
        Some(&admin),
        None,
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "CD1");
    let (status, _) = send(&app, "GET", &format!("/api/desk/{desk_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
