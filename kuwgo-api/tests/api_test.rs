use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::TimeZone;
use jsonwebtoken::{encode, EncodingKey, Header};
use kuwgo_api::middleware::CallerClaims;
use kuwgo_api::{app, AppState, AuthConfig};
use kuwgo_booking::{
    BookingEngine, EngineDeps, EngineSettings, InMemoryBookingRepository, InMemoryNotificationRepository,
    InMemoryRedemptionRepository, InMemorySeatLedger,
};
use kuwgo_catalog::{DemoSeed, InMemoryCatalog};
use kuwgo_core::{Clock, FixedClock, LogOnlySender, NoopEventPublisher};
use kuwgo_shared::time::kuwait_offset;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    clock: Arc<FixedClock>,
}

fn test_app(seat_price: Decimal) -> TestApp {
    let clock = Arc::new(FixedClock::new(kuwait_offset().with_ymd_and_hms(2025, 12, 28, 8, 0, 0).unwrap()));
    let catalog = Arc::new(InMemoryCatalog::new());
    DemoSeed::apply(&catalog, clock.now()).unwrap();

    let deps = EngineDeps {
        catalog: catalog.clone(),
        bookings: Arc::new(InMemoryBookingRepository::new()),
        redemptions: Arc::new(InMemoryRedemptionRepository::new()),
        notifications: Arc::new(InMemoryNotificationRepository::new()),
        seats: Arc::new(InMemorySeatLedger::new()),
        sender: Arc::new(LogOnlySender),
        events: Arc::new(NoopEventPublisher),
        clock: clock.clone(),
    };
    let settings = EngineSettings {
        seat_price,
        ..EngineSettings::default()
    };

    let state = AppState {
        engine: Arc::new(BookingEngine::new(deps, settings)),
        catalog,
        clock: clock.clone(),
        rate_limiter: None,
        rate_limit_per_minute: 100,
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };

    TestApp {
        router: app(state),
        clock,
    }
}

fn token(sub: &str, role: &str) -> String {
    let claims = CallerClaims {
        sub: sub.to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

impl TestApp {
    async fn call(&self, method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn first_trip_id(&self) -> String {
        let (_, trips) = self.call("GET", "/v1/trips", None, None).await;
        trips[0]["id"].as_str().unwrap().to_string()
    }

    async fn book(&self, trip_id: &str, seat: u32, bearer: Option<&str>) -> (StatusCode, Value) {
        let body = json!({
            "trip_id": trip_id,
            "seat_number": seat,
            "passenger_name": "Fatima Al-Sabah",
            "passenger_phone": "55512345",
        });
        self.call("POST", "/v1/bookings", bearer, Some(body)).await
    }
}

#[tokio::test]
async fn test_health() {
    let app = test_app(Decimal::new(2000, 3));
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_upcoming_trips_are_ordered_by_departure() {
    let app = test_app(Decimal::new(2000, 3));
    let (status, trips) = app.call("GET", "/v1/trips", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let trips = trips.as_array().unwrap();
    assert_eq!(trips.len(), 3);
    assert_eq!(trips[1]["status"], "DELAYED");
    assert_eq!(trips[1]["delay_minutes"], 15);

    let (status, stations) = app.call("GET", "/v1/stations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stations.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_create_pay_and_redeem_over_http() {
    let app = test_app(Decimal::from(20));
    let user = token("user-1", "CUSTOMER");
    let trip_id = app.first_trip_id().await;

    let (status, booking) = app.book(&trip_id, 12, Some(&user)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "PENDING_PAYMENT");
    assert_eq!(booking["user_id"], "user-1");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, seats) = app.call("GET", &format!("/v1/trips/{}/seats", trip_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seats["taken_seats"], json!([12]));

    let payment = json!({ "method": "KNET", "bank": "NBK", "card_number": "4111111111111111", "pin": "1234" });
    let (status, paid) = app
        .call("POST", &format!("/v1/bookings/{}/pay", booking_id), Some(&user), Some(payment))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "CONFIRMED");

    let (status, summary) = app.call("GET", "/v1/loyalty", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["balance"], 200);
    assert_eq!(summary["redeemable_tickets"], 1);

    let (status, redeemed) = app.call("POST", "/v1/loyalty/redeem", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(redeemed["balance"], 0);

    let (status, body) = app.call("POST", "/v1/loyalty/redeem", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_POINTS");
}

#[tokio::test]
async fn test_second_booking_for_same_seat_conflicts() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;

    let (status, _) = app.book(&trip_id, 5, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.book(&trip_id, 5, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SEAT_TAKEN");
}

#[tokio::test]
async fn test_bad_seat_and_unknown_trip() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;

    let (status, body) = app.book(&trip_id, 9999, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SEAT");

    let (status, body) = app.book(&uuid::Uuid::new_v4().to_string(), 1, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_other_users_booking_is_forbidden() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;
    let owner = token("owner", "CUSTOMER");
    let intruder = token("intruder", "CUSTOMER");

    let (_, booking) = app.book(&trip_id, 3, Some(&owner)).await;
    let uri = format!("/v1/bookings/{}", booking["id"].as_str().unwrap());

    let (status, body) = app.call("GET", &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    let (status, _) = app.call("GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_knet_without_pin_is_rejected() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;
    let (_, booking) = app.book(&trip_id, 7, None).await;

    let uri = format!("/v1/bookings/{}/pay", booking["id"].as_str().unwrap());
    let (status, body) = app.call("POST", &uri, None, Some(json!({ "method": "KNET" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYMENT_INPUT");

    let (status, body) = app.call("POST", &uri, None, Some(json!({ "method": "APPLE_PAY" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    let (status, body) = app.call("POST", &uri, None, Some(json!({ "method": "APPLE_PAY" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_cancel_quotes_refund_and_rejects_after_departure() {
    let app = test_app(Decimal::from(10));
    let trip_id = app.first_trip_id().await;

    let (_, first) = app.book(&trip_id, 1, None).await;
    let (_, second) = app.book(&trip_id, 2, None).await;

    // Departs in one hour: inside the 24h window
    let (status, quote) = app
        .call("GET", &format!("/v1/bookings/{}/refund-quote", first["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["deduction_percent"], "25");

    let (status, cancelled) = app
        .call("POST", &format!("/v1/bookings/{}/cancel", first["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["booking"]["status"], "CANCELLED");

    app.clock.advance(chrono::Duration::hours(2));

    let (status, body) = app
        .call("POST", &format!("/v1/bookings/{}/cancel", second["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "TRIP_ALREADY_DEPARTED");
}

#[tokio::test]
async fn test_delete_pending_booking_frees_seat() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;

    let (_, booking) = app.book(&trip_id, 9, None).await;
    let (status, _) = app
        .call("DELETE", &format!("/v1/bookings/{}", booking["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.book(&trip_id, 9, None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = test_app(Decimal::new(2000, 3));
    let (status, body) = app.call("GET", "/v1/bookings", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_admin_delay_notifies_passengers() {
    let app = test_app(Decimal::new(2000, 3));
    let trip_id = app.first_trip_id().await;
    app.book(&trip_id, 1, None).await;
    app.book(&trip_id, 2, None).await;

    let uri = format!("/v1/admin/trips/{}/status", trip_id);
    let body = json!({ "status": "DELAYED", "delay_minutes": 20 });

    let (status, _) = app.call("PUT", &uri, None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = token("user-1", "CUSTOMER");
    let (status, _) = app.call("PUT", &uri, Some(&customer), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = token("ops-1", "ADMIN");
    let (status, update) = app.call("PUT", &uri, Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["trip"]["status"], "DELAYED");
    assert_eq!(update["notifications"]["attempted"], 2);
    assert_eq!(update["notifications"]["sent"], 2);

    let (status, notifications) = app.call("GET", "/v1/admin/notifications", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| n["recipient"] == "+96555512345"));
}
