use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// An error that can be returned from a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request can't be fulfilled as sent. The reason is shown to the
    /// client.
    BadRequestReason(String),
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequestReason(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorRep { message })).into_response()
            }
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRep {
                    message: "Internal server error.".to_owned(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(?error, "Received error.");

        Self::InternalServerError
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorRep {
    pub message: String,
}
