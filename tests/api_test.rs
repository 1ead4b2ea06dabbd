use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use roomkeeper::config::Config;
use roomkeeper::infrastructure::AppState;
use roomkeeper::{db, seed, server};

// Helper to build the full router over a fresh in-memory database
async fn setup_app() -> Router {
    let config = Config::in_memory();
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to init DB");
    seed::seed_global_amenities(&db)
        .await
        .expect("Failed to seed amenities");
    server::build_router(AppState::new(db, &config), &config)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(sub) = user {
        builder = builder
            .header("x-user-sub", sub)
            .header("x-user-email", format!("{}@example.com", sub));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn villa() -> Value {
    json!({
        "name": "Villa Aurora",
        "address": "Via Roma 1",
        "city": "Lecce",
        "country": "IT",
        "amenities": [{ "id": "pa_wifi" }, { "name": "Rooftop bar" }]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "roomkeeper");
}

#[tokio::test]
async fn test_mutations_require_identity() {
    let app = setup_app().await;
    let (status, body) = send(&app, "POST", "/api/properties", None, Some(villa())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_property_lifecycle_over_http() {
    let app = setup_app().await;

    let (status, created) =
        send(&app, "POST", "/api/properties", Some("owner"), Some(villa())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["amenities"].as_array().unwrap().len(), 2);
    let id = created["id"].as_str().unwrap().to_string();

    // Drafts are invisible to anonymous callers
    let (status, _) = send(&app, "GET", &format!("/api/properties/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/properties/{}/publish", id),
        Some("owner"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, room) = send(
        &app,
        "POST",
        &format!("/api/properties/{}/rooms", id),
        Some("owner"),
        Some(json!({ "room_type": "double", "price": 95.0, "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["room_type"], "DOUBLE");
    let room_uri = format!("/api/rooms/{}", room["id"].as_str().unwrap());

    // A draft's rooms are as invisible as the draft itself
    let (status, _) = send(&app, "GET", &room_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/properties/{}/rooms", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &room_uri, Some("owner"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, published) = send(
        &app,
        "POST",
        &format!("/api/properties/{}/publish", id),
        Some("owner"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "PUBLISHED");

    let (status, _) = send(&app, "GET", &room_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, results) = send(&app, "GET", "/api/search?location=lecce", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/properties/{}", id),
        Some("owner"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/properties/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forbidden_and_not_found_are_distinct() {
    let app = setup_app().await;
    let (_, created) = send(&app, "POST", "/api/properties", Some("owner"), Some(villa())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let rename = json!({ "name": "Taken over" });
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/properties/{}", id),
        Some("intruder"),
        Some(rename.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/properties/does-not-exist",
        Some("owner"),
        Some(rename),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_room_type_is_bad_request() {
    let app = setup_app().await;
    let (_, created) = send(&app, "POST", "/api/properties", Some("owner"), Some(villa())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/properties/{}/rooms", id),
        Some("owner"),
        Some(json!({ "room_type": "penthouse", "price": 95.0, "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("penthouse"));
}

#[tokio::test]
async fn test_amenity_catalog_endpoints() {
    let app = setup_app().await;

    let (status, globals) = send(&app, "GET", "/api/amenities/room", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(globals.as_array().unwrap().len() >= 6);

    let (status, found) = send(&app, "GET", "/api/amenities/property?name=WIFI", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["id"], "pa_wifi");

    let (status, _) = send(&app, "GET", "/api/amenities/room/ra_nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
