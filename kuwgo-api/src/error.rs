use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use kuwgo_booking::BookingError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Booking(e) => match e {
                BookingError::SeatTaken { .. } => (StatusCode::CONFLICT, "SEAT_TAKEN"),
                BookingError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
                BookingError::TripAlreadyDeparted(_) => (StatusCode::UNPROCESSABLE_ENTITY, "TRIP_ALREADY_DEPARTED"),
                BookingError::InvalidPaymentInput(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYMENT_INPUT"),
                BookingError::InvalidSeat { .. } => (StatusCode::BAD_REQUEST, "INVALID_SEAT"),
                BookingError::InsufficientPoints { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_POINTS"),
                BookingError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                BookingError::NotOwner(_) => (StatusCode::FORBIDDEN, "NOT_OWNER"),
                BookingError::Busy => (StatusCode::SERVICE_UNAVAILABLE, "BUSY"),
                BookingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            },
            AppError::AuthenticationError(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::AuthorizationError(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal Server Error: {}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        let mut response = (status, body).into_response();
        if matches!(&self, AppError::Booking(e) if e.is_retryable()) {
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
