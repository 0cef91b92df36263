//! Canonical error taxonomy for every handler.
//!
//! Each variant maps to exactly one status code. Errors render as
//! `{status, url, message}`; the `url` is filled in by [`attach_request_url`]
//! so construction sites never need the request.

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("could not verify, check for valid credentials")]
    BadCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Gone(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Gone(_) => StatusCode::GONE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = e {
            return AppError::NotFound("no matching record".into());
        }
        if let Some(db) = e.as_database_error() {
            // Postgres SQLSTATEs for constraint and value-range failures
            match db.code().as_deref() {
                Some("23505") => return AppError::Conflict(db.message().to_string()),
                Some("23503") | Some("23502") | Some("23514") | Some("22P02") | Some("22001")
                | Some("22003") => {
                    return AppError::Validation(db.message().to_string())
                }
                _ => {}
            }
        }
        AppError::Internal(e.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        let body = ErrorBody {
            status: status.as_u16(),
            url: None,
            message: self.to_string(),
        };
        let mut res = (status, Json(body.clone())).into_response();
        if let AppError::BadCredentials = self {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"login required\""),
            );
        }
        res.extensions_mut().insert(body);
        res
    }
}

/// Fills the `url` of error bodies with the URL of the request that failed.
pub async fn attach_request_url(req: Request, next: Next) -> Response {
    let url = req.uri().to_string();
    let mut res = next.run(req).await;
    match res.extensions_mut().remove::<ErrorBody>() {
        Some(mut body) => {
            body.url = Some(url);
            let (parts, _) = res.into_parts();
            (parts, Json(body)).into_response()
        }
        None => res,
    }
}

/// Fallback for unmatched routes.
pub async fn not_found_fallback() -> AppError {
    AppError::not_found("The requested URL was not found on the server")
}
