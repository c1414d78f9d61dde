use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub mod codes {
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failures of the JSON API. The client only ever sees the code; details
/// stay in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("server misconfigured: {0}")]
    ServerError(&'static str),
    #[error("no valid session")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            ApiError::RateLimited { .. } => codes::RATE_LIMITED,
            ApiError::ServerError(_) => codes::SERVER_ERROR,
            ApiError::Unauthorized => codes::UNAUTHORIZED,
            ApiError::NotFound => codes::NOT_FOUND,
            ApiError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            ApiError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };
        let message = match &self {
            ApiError::BadRequest(message) => Some(message.clone()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.code(),
            retry_after,
            message,
        };

        let mut response = (self.status(), Json(body)).into_response();
        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("root directory does not exist: {0}")]
    MissingRoot(String),
    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Content(#[from] kiln_core::ContentError),
    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}
