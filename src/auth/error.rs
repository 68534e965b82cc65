use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::auth::DenyReason;

/// Failures surfaced by the authorization core and the services built on it.
///
/// `Unauthenticated` (no user) and `Forbidden` (user present, check failed) are
/// kept apart all the way to the HTTP status.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(DenyReason),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated | AccessError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccessError::NotFound(_) => StatusCode::NOT_FOUND,
            AccessError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AccessError::Token(_) | AccessError::Password(_) | AccessError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UNAUTHENTICATED",
            AccessError::Forbidden(_) => "FORBIDDEN",
            AccessError::NotFound(_) => "NOT_FOUND",
            AccessError::InvalidCredentials => "INVALID_CREDENTIALS",
            AccessError::InvalidInput(_) => "BAD_REQUEST",
            AccessError::Token(_) | AccessError::Password(_) | AccessError::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a client; internal failures are not echoed back.
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn log_if_internal(&self) {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        self.log_if_internal();
        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl ErrorExtensions for AccessError {
    fn extend(&self) -> async_graphql::Error {
        self.log_if_internal();
        async_graphql::Error::new(self.public_message()).extend_with(|_, e| {
            e.set("code", self.code());
            e.set("status", i32::from(self.status().as_u16()));
        })
    }
}
