//! HTTP-level tests for the booking API, driven through the axum router over an
//! in-memory ledger.

#![allow(clippy::unwrap_used)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use seat_allocator::{
    app,
    cache::CacheService,
    config::Config,
    services::{booking::AllocationRequest, ledger::MemoryBookingLedger},
    AppState,
};

fn test_app() -> (Router, Arc<AppState>) {
    let config = Config::from_lookup(|_| None).unwrap();
    let state = AppState::from_parts(
        config,
        Arc::new(MemoryBookingLedger::new()),
        CacheService::disabled(),
    )
    .unwrap();
    (app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

async fn book(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/seatBooking")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn book_raw(app: &Router, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/seatBooking");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    send(app, request.body(Body::from(body)).unwrap()).await
}

async fn status(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri("/api/showBookedSeat")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn reset(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/resetBooking")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_and_banner() {
    let (app, _) = test_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (code, body) = send(&app, request).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!("OK"));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (code, _) = send(&app, request).await;
    assert_eq!(code, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_hall_status() {
    let (app, _) = test_app();

    let (code, body) = status(&app).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["seatNumbers"], json!([]));
    assert_eq!(body["bookedSeatsCount"], 0);
    assert_eq!(body["availableSeats"], 80);
    assert_eq!(body["currentBookingKey"], 0);
}

#[tokio::test]
async fn test_booking_flow() {
    let (app, _) = test_app();

    let (code, body) = book(&app, json!({ "user_id": 1, "seats": 5 })).await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(body["message"], "Seats booked successfully");
    assert_eq!(body["allocatedSeats"], json!([1, 2, 3, 4, 5]));

    let (code, body) = book(&app, json!({ "user_id": 2, "seats": 3 })).await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(body["allocatedSeats"], json!([8, 9, 10]));

    let (code, body) = status(&app).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["seatNumbers"], json!([1, 2, 3, 4, 5, 8, 9, 10]));
    assert_eq!(body["bookedSeatsCount"], 8);
    assert_eq!(body["availableSeats"], 72);
    assert_eq!(body["currentBookingKey"], 3);
}

#[tokio::test]
async fn test_invalid_requests() {
    let (app, _) = test_app();

    for seats in [0, 8, -1] {
        let (code, body) = book(&app, json!({ "user_id": 1, "seats": seats })).await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "seats={seats}");
        assert_eq!(body["message"], "You can reserve between 1 and 7 seats at a time.");
    }

    let (code, body) = book(&app, json!({ "user_id": 1 })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You can reserve between 1 and 7 seats at a time.");

    let (code, body) = book(&app, json!({ "seats": 2 })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User ID is required.");

    for user_id in [0, -7] {
        let (code, body) = book(&app, json!({ "user_id": user_id, "seats": 2 })).await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "user_id={user_id}");
        assert_eq!(body["message"], "User ID is required.");
    }

    let (_, body) = status(&app).await;
    assert_eq!(body["bookedSeatsCount"], 0);
}

#[tokio::test]
async fn test_unparseable_body_is_a_json_400() {
    let (app, _) = test_app();
    let json_type = Some("application/json");

    let cases = [
        (json_type, r#"{"user_id":1,"seats":"3"}"#),
        (json_type, r#"{"user_id":1,"seats":2.0}"#),
        (json_type, r#"{"user_id":1,"#),
        (None, r#"{"user_id":1,"seats":2}"#),
        (Some("text/plain"), r#"{"user_id":1,"seats":2}"#),
    ];
    for (content_type, raw) in cases {
        let (code, body) = book_raw(&app, content_type, raw).await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "{content_type:?} {raw}");
        assert!(body["message"].is_string(), "{raw} -> {body}");
    }

    let (_, body) = status(&app).await;
    assert_eq!(body["bookedSeatsCount"], 0);
}

#[tokio::test]
async fn test_not_enough_seats_reports_available_count() {
    let (app, state) = test_app();

    // 11 полных рядов и 1 место из последнего: остается 2 свободных
    for _ in 0..11 {
        state.booking.allocate(&AllocationRequest::new(9, 7)).await.unwrap();
    }
    state.booking.allocate(&AllocationRequest::new(9, 1)).await.unwrap();

    let (code, body) = book(&app, json!({ "user_id": 1, "seats": 3 })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking failed, only 2 seats available to book");

    let (code, body) = book(&app, json!({ "user_id": 1, "seats": 2 })).await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(body["allocatedSeats"], json!([79, 80]));
}

#[tokio::test]
async fn test_reset_frees_every_seat() {
    let (app, _) = test_app();

    book(&app, json!({ "user_id": 1, "seats": 7 })).await;
    book(&app, json!({ "user_id": 2, "seats": 4 })).await;

    let (code, body) = reset(&app).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["message"], "All bookings have been reset.");
    assert_eq!(body["bookingsDeleted"], 11);

    let (_, body) = status(&app).await;
    assert_eq!(body["bookedSeatsCount"], 0);
    assert_eq!(body["availableSeats"], 80);

    let (code, body) = book(&app, json!({ "user_id": 3, "seats": 1 })).await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(body["allocatedSeats"], json!([1]));

    // повторный сброс тоже успешен
    let (code, _) = reset(&app).await;
    assert_eq!(code, StatusCode::OK);
    let (code, _) = reset(&app).await;
    assert_eq!(code, StatusCode::OK);
}
