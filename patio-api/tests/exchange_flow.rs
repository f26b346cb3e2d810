use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use patio_api::state::{AppState, AuthConfig};
use patio_api::app;
use patio_domain::memory::{
    InMemoryFamilyDirectory, InMemoryOfferRepository, InMemoryRequestRepository,
    InMemorySpotRepository,
};
use patio_domain::{ExchangeConfig, ParkingExchange, ParkingSpot};

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    let spots = InMemorySpotRepository::with_spots(vec![
        ParkingSpot {
            code: "G-1".into(),
            owner_family_code: "UF-001".into(),
            floor: 0,
        },
        ParkingSpot {
            code: "G-2".into(),
            owner_family_code: "UF-002".into(),
            floor: -1,
        },
    ]);
    let directory = InMemoryFamilyDirectory::with_users(vec![
        ("user-ana", "UF-001"),
        ("user-ben", "UF-002"),
    ]);
    let exchange = Arc::new(ParkingExchange::new(
        Arc::new(InMemoryOfferRepository::new()),
        Arc::new(InMemoryRequestRepository::new()),
        Arc::new(spots),
        ExchangeConfig::default(),
    ));

    app(AppState {
        exchange,
        directory: Arc::new(directory),
        auth: AuthConfig {
            secret: SECRET.into(),
            expiration: 3600,
        },
    })
}

fn bearer(sub: &str) -> String {
    let claims = json!({ "sub": sub, "exp": 4102444800u64 });
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    sub: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(sub));

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::empty()).unwrap()
        }
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn offer_accept_and_split_over_http() {
    let app = test_app();

    let (status, offer) = send(
        &app,
        "POST",
        "/v1/parking/offers",
        "user-ana",
        Some(json!({
            "spot_code": "G-1",
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T21:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(offer["state"], "activa");
    assert_eq!(offer["floor"], 0);
    let offer_id = offer["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/v1/parking/offers", "user-ben", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, acceptance) = send(
        &app,
        "POST",
        &format!("/v1/parking/offers/{offer_id}/accept"),
        "user-ben",
        Some(json!({
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(acceptance["state"], "aceptada");
    assert_eq!(acceptance["linked_offer_id"], offer["id"]);

    // The 8h remainder was re-offered; the original is gone from listings.
    let (_, listed) = send(&app, "GET", "/v1/parking/offers", "user-ben", None).await;
    let listed = listed.as_array().unwrap().clone();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["window_start"], "2025-06-01T13:00:00Z");
    assert_ne!(listed[0]["id"], offer["id"]);

    // The acceptance shows up in the requester's own requests.
    let (status, own) = send(&app, "GET", "/v1/parking/requests", "user-ben", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().unwrap().len(), 1);
    assert_eq!(own[0]["id"], acceptance["id"]);

    // A second acceptance of the consumed offer is a state conflict.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/parking/offers/{offer_id}/accept"),
        "user-ben",
        Some(json!({
            "window_start": "2025-06-01T13:00:00Z",
            "window_end": "2025-06-01T21:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn domain_errors_map_to_http_statuses() {
    let app = test_app();

    // Invalid range → 400.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/parking/offers",
        "user-ana",
        Some(json!({
            "spot_code": "G-1",
            "window_start": "2025-06-01T13:00:00Z",
            "window_end": "2025-06-01T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Someone else's spot → 403.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/parking/offers",
        "user-ben",
        Some(json!({
            "spot_code": "G-1",
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Overlapping active offer → 409.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/parking/offers",
        "user-ana",
        Some(json!({
            "spot_code": "G-1",
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/v1/parking/offers",
        "user-ana",
        Some(json!({
            "spot_code": "G-1",
            "window_start": "2025-06-01T10:00:00Z",
            "window_end": "2025-06-01T12:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown offer → 404.
    let (status, _) = send(
        &app,
        "DELETE",
        "/v1/parking/offers/00000000-0000-0000-0000-000000000000",
        "user-ana",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Need request without a floor → 400.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/parking/requests",
        "user-ben",
        Some(json!({
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn need_request_lifecycle_over_http() {
    let app = test_app();

    let (status, request) = send(
        &app,
        "POST",
        "/v1/parking/requests",
        "user-ben",
        Some(json!({
            "requested_floor": -1,
            "window_start": "2025-06-01T09:00:00Z",
            "window_end": "2025-06-01T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["state"], "pendiente");
    assert_eq!(request["linked_offer_id"], Value::Null);
    let request_id = request["id"].as_str().unwrap().to_string();

    // Only the creator may cancel.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/parking/requests/{request_id}"),
        "user-ana",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = send(
        &app,
        "DELETE",
        &format!("/v1/parking/requests/{request_id}"),
        "user-ben",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["state"], "cancelada");

    // Cancelled requests drop out of the listing.
    let (_, own) = send(&app, "GET", "/v1/parking/requests", "user-ben", None).await;
    assert!(own.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn callers_without_identity_are_rejected() {
    let app = test_app();

    // No bearer token at all.
    let request = Request::builder()
        .method("GET")
        .uri("/v1/parking/offers")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A valid token whose subject has no family unit.
    let (status, body) = send(&app, "GET", "/v1/parking/offers", "user-ghost", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    // Garbage token.
    let request = Request::builder()
        .method("GET")
        .uri("/v1/parking/offers")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
