use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::BookingError;
use crate::models::SeatNo;
use crate::services::booking::{AllocationRequest, BookingStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seatBooking", post(seat_booking))
        .route("/showBookedSeat", get(show_booked_seat))
        .route("/resetBooking", post(reset_booking))
}

/* ---------- ALLOCATE ---------- */

// POST /api/seatBooking
#[derive(Debug, Deserialize)]
struct SeatBookingRequest {
    user_id: Option<i64>,
    seats: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatBookingResponse {
    message: &'static str,
    allocated_seats: Vec<SeatNo>,
}

async fn seat_booking(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SeatBookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BookingError> {
    // тело, которое не разобралось (не JSON, seats строкой и т.п.), тоже 400
    let Json(req) = body.map_err(|rejection| {
        tracing::info!("seat_booking body rejected: {}", rejection.body_text());
        BookingError::InvalidRequest(
            "Request body must be JSON with integer user_id and seats.".to_string(),
        )
    })?;

    // без seats запрос так же невалиден, как и seats = 0
    let request = AllocationRequest {
        requester_id: req.user_id,
        seat_count: req.seats.unwrap_or(0),
    };

    let allocation = match state.booking.allocate(&request).await {
        Ok(allocation) => allocation,
        Err(e) => {
            tracing::info!("seat_booking rejected for {:?}: {}", req.user_id, e);
            return Err(e);
        }
    };

    state.cache.invalidate_status().await;

    Ok((
        StatusCode::CREATED,
        Json(SeatBookingResponse {
            message: "Seats booked successfully",
            allocated_seats: allocation.seats,
        }),
    ))
}

/* ---------- STATUS ---------- */

// GET /api/showBookedSeat
#[derive(Debug, Serialize)]
struct StatusResponse {
    message: &'static str,
    #[serde(flatten)]
    status: BookingStatus,
}

async fn show_booked_seat(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    // Сначала пробуем кеш
    if let Some(status) = state.cache.get_status().await {
        return Ok(([("X-Cache", "HIT")], status_response(status)));
    }

    // поколение читаем до ledger: если между чтением и записью был коммит,
    // записанный статус уже не совпадет с поколением и не будет отдан
    let generation = state.cache.generation().await;
    let status = state.booking.status().await?;
    if let Some(generation) = generation {
        state.cache.save_status(generation, &status).await;
    }

    Ok(([("X-Cache", "MISS")], status_response(status)))
}

fn status_response(status: BookingStatus) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Seats booked successfully",
        status,
    })
}

/* ---------- RESET ---------- */

// POST /api/resetBooking - полный сброс всех броней
async fn reset_booking(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let removed = state.booking.reset().await?;
    state.cache.invalidate_status().await;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "All bookings have been reset.",
            "bookingsDeleted": removed,
        })),
    ))
}
