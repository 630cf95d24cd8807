use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use travelease::db::{seed, SqliteStore, Store};
use travelease::handlers;
use travelease::services::ai::{LlmProvider, Message};
use travelease::state::AppState;

// ── Mock Providers ──

struct MockLlm {
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(&self, _system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(last.clone());

        if last.to_lowercase().contains("bali") {
            Ok("April to October is the dry season in Bali.".to_string())
        } else {
            Ok("Happy to help with your trip!".to_string())
        }
    }
}

struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> anyhow::Result<String> {
        anyhow::bail!("upstream timed out")
    }
}

// ── Helpers ──

fn state_with(llm: Box<dyn LlmProvider>) -> Arc<AppState> {
    let store = SqliteStore::open(":memory:").unwrap();
    seed::seed_destinations(&store).unwrap();
    Arc::new(AppState {
        store: Box::new(store),
        llm,
    })
}

fn test_state() -> Arc<AppState> {
    state_with(Box::new(MockLlm {
        prompts: Arc::new(Mutex::new(vec![])),
    }))
}

async fn send(state: &Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    handlers::router(state.clone())
        .oneshot(request)
        .await
        .unwrap()
}

async fn body_json(res: Response) -> Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn flight_booking() -> Value {
    json!({
        "userId": 1,
        "serviceType": "flight",
        "status": "pending",
        "details": {
            "from": "NYC",
            "to": "LON",
            "departDate": "2024-12-01",
            "returnDate": "2024-12-10",
            "passengers": "2",
            "tripType": "roundtrip",
            "cabinClass": "business",
        },
        "totalPrice": 2700,
    })
}

fn hotel_booking() -> Value {
    json!({
        "userId": 1,
        "serviceType": "hotel",
        "details": {
            "location": "Rome",
            "checkIn": "2024-06-01",
            "checkOut": "2024-06-04",
            "rooms": "1",
            "adults": "2",
            "children": "0",
            "roomType": "suite",
        },
        "totalPrice": 1125,
    })
}

async fn register(state: &Arc<AppState>, username: &str, email: &str) -> Response {
    send(
        state,
        "POST",
        "/api/users/register",
        Some(json!({ "username": username, "password": "s3cret", "email": email })),
    )
    .await
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let res = send(&state, "GET", "/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({ "status": "ok" }));
}

// ── Users ──

#[tokio::test]
async fn test_register_and_fetch_user_without_password() {
    let state = test_state();

    let res = register(&state, "traveler", "traveler@example.com").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let user = body_json(res).await;
    assert_eq!(user["id"], 1);
    assert_eq!(user["username"], "traveler");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let res = send(&state, "GET", "/api/users/1", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, user);

    let res = send(&state, "GET", "/api/users/77", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_conflicts() {
    let state = test_state();
    register(&state, "traveler", "traveler@example.com").await;

    let res = register(&state, "traveler", "other@example.com").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Username already exists");

    let res = register(&state, "someone", "traveler@example.com").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Email already exists");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let state = test_state();
    let res = send(
        &state,
        "POST",
        "/api/users/register",
        Some(json!({ "username": "traveler", "password": "s3cret", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["errors"][0]["field"], "email");
}

#[tokio::test]
async fn test_login() {
    let state = test_state();
    register(&state, "traveler", "traveler@example.com").await;

    let res = send(
        &state,
        "POST",
        "/api/login",
        Some(json!({ "username": "traveler", "password": "s3cret" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["username"], "traveler");

    for creds in [
        json!({ "username": "traveler", "password": "wrong" }),
        json!({ "username": "nobody", "password": "s3cret" }),
    ] {
        let res = send(&state, "POST", "/api/login", Some(creds)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "Invalid credentials");
    }

    let res = send(&state, "POST", "/api/login", Some(json!({ "username": "traveler" }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Destinations ──

#[tokio::test]
async fn test_destinations() {
    let state = test_state();

    let res = send(&state, "GET", "/api/destinations", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let all = body_json(res).await;
    assert_eq!(all.as_array().unwrap().len(), 6);

    let res = send(&state, "GET", "/api/destinations/featured", None).await;
    let featured = body_json(res).await;
    assert!(featured
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["featured"] == true));

    let res = send(&state, "GET", "/api/destinations/1", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, all[0]);

    let res = send(&state, "GET", "/api/destinations/99", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(&state, "GET", "/api/destinations/abc", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Invalid destination ID");
}

// ── Bookings ──

#[tokio::test]
async fn test_flight_booking_round_trip() {
    let state = test_state();

    let res = send(&state, "POST", "/api/bookings", Some(flight_booking())).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body_json(res).await;
    assert_eq!(created["totalPrice"], 2700);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["serviceType"], "flight");

    let uri = format!("/api/bookings/{}", created["id"]);
    let res = send(&state, "GET", &uri, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, created);
}

#[tokio::test]
async fn test_hotel_booking_price() {
    let state = test_state();
    let res = send(&state, "POST", "/api/bookings", Some(hotel_booking())).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body_json(res).await["totalPrice"], 1125);
}

#[tokio::test]
async fn test_submitted_status_is_ignored() {
    let state = test_state();
    let mut payload = flight_booking();
    payload["status"] = json!("confirmed");

    let res = send(&state, "POST", "/api/bookings", Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body_json(res).await["status"], "pending");
}

#[tokio::test]
async fn test_invalid_booking_reports_field_paths() {
    let state = test_state();
    let mut payload = flight_booking();
    payload["details"]["from"] = json!("N");
    payload["details"]["cabinClass"] = json!("luxury");

    let res = send(&state, "POST", "/api/bookings", Some(payload)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"details.from"));
    assert!(fields.contains(&"details.cabinClass"));

    assert!(state.store.get_user_bookings(1).unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_booking_is_not_found() {
    let state = test_state();
    let res = send(&state, "GET", "/api/bookings/9999", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["message"], "Booking not found");

    let res = send(&state, "GET", "/api/bookings/nine", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Invalid booking ID");
}

#[tokio::test]
async fn test_user_bookings_list() {
    let state = test_state();
    send(&state, "POST", "/api/bookings", Some(flight_booking())).await;
    send(&state, "POST", "/api/bookings", Some(hotel_booking())).await;

    let res = send(&state, "GET", "/api/users/1/bookings", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let list = body_json(res).await;
    let types: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["serviceType"].as_str())
        .collect();
    assert_eq!(types, vec!["flight", "hotel"]);

    let res = send(&state, "GET", "/api/users/2/bookings", None).await;
    assert_eq!(body_json(res).await, json!([]));
}

#[tokio::test]
async fn test_update_booking_status() {
    let state = test_state();
    let res = send(&state, "POST", "/api/bookings", Some(flight_booking())).await;
    let created = body_json(res).await;
    let uri = format!("/api/bookings/{}/status", created["id"]);

    let res = send(&state, "PATCH", &uri, Some(json!({ "status": "confirmed" }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["status"], "confirmed");
    assert_eq!(updated["details"], created["details"]);
    assert_eq!(updated["totalPrice"], created["totalPrice"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let res = send(&state, "PATCH", &uri, Some(json!({ "status": "refunded" }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Invalid status value");

    let res = send(
        &state,
        "PATCH",
        "/api/bookings/424242/status",
        Some(json!({ "status": "canceled" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quote_matches_booking() {
    let state = test_state();
    let mut payload = flight_booking();
    payload.as_object_mut().unwrap().remove("totalPrice");

    let res = send(&state, "POST", "/api/quotes", Some(payload)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await,
        json!({ "serviceType": "flight", "totalPrice": 2700 })
    );
}

// ── Chat ──

#[tokio::test]
async fn test_chat_relay_and_history() {
    let prompts = Arc::new(Mutex::new(vec![]));
    let state = state_with(Box::new(MockLlm {
        prompts: Arc::clone(&prompts),
    }));

    let res = send(
        &state,
        "POST",
        "/api/chat",
        Some(json!({ "message": "When should I visit Bali?", "userId": 3 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await["message"],
        "April to October is the dry season in Bali."
    );
    assert_eq!(prompts.lock().unwrap().len(), 1);

    send(
        &state,
        "POST",
        "/api/chat",
        Some(json!({ "message": "Any hotel tips?", "userId": 3 })),
    )
    .await;

    let res = send(&state, "GET", "/api/users/3/chat-history", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let history = body_json(res).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 4);

    let roles: Vec<&str> = history.iter().filter_map(|m| m["role"].as_str()).collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);

    let stamps: Vec<&str> = history
        .iter()
        .filter_map(|m| m["timestamp"].as_str())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        stamps.iter().map(|s| s.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_empty_chat_message_is_rejected() {
    let prompts = Arc::new(Mutex::new(vec![]));
    let state = state_with(Box::new(MockLlm {
        prompts: Arc::clone(&prompts),
    }));

    let res = send(
        &state,
        "POST",
        "/api/chat",
        Some(json!({ "message": "", "userId": 5 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Message content is required");

    assert!(prompts.lock().unwrap().is_empty());
    assert!(state.store.get_user_chat_history(5).unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_upstream_failure() {
    let state = state_with(Box::new(FailingLlm));

    let res = send(
        &state,
        "POST",
        "/api/chat",
        Some(json!({ "message": "hello", "userId": 8 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(res).await["message"],
        "Error processing chat message"
    );

    let history = state.store.get_user_chat_history(8).unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_chat_suggestions() {
    let state = test_state();
    let res = send(&state, "GET", "/api/chat/suggestions", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["suggestions"].as_array().unwrap().len(), 6);
    assert!(json["welcome"].as_str().unwrap().contains("TravelEase"));
}
