use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::SeatNo;

#[derive(Debug, Error)]
pub enum BookingError {
    /// Запрос отклонен до чтения занятости: нет user_id или неверное число мест.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Booking failed, only {available} seats available to book")]
    InsufficientCapacity { available: usize },

    /// Кто-то успел занять часть мест между снимком и коммитом.
    #[error("seats {seats:?} were booked by a concurrent request")]
    AllocationConflict { seats: Vec<SeatNo> },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::InvalidRequest(_) | BookingError::InsufficientCapacity { .. } => {
                StatusCode::BAD_REQUEST
            }
            BookingError::AllocationConflict { .. } => StatusCode::CONFLICT,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            BookingError::Storage(e) => {
                tracing::error!("booking storage error: {:?}", e);
                "Internal error while processing booking".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
