//! Error types for coaweb-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coaweb_core::error::{ErrorCode, ErrorDetails};
use coaweb_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::EntityNotFound | ErrorCode::AccountNotFound => StatusCode::NOT_FOUND,
                ErrorCode::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::FileNotFound | ErrorCode::InvalidFormat => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::InvalidFormat, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "coaweb::api", "{}", self);
        } else {
            log::debug!(target: "coaweb::api", "{}", self);
        }
        (status, Json(self.details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
