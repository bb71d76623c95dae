use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::state::AppState;

pub type AppResult<T> = Result<T, AppError>;

const MASKED_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match db_error_code(e).as_deref() {
                Some("23505") => StatusCode::CONFLICT,
                Some("23503") | Some("23514") => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the store rejected a write because a unique key is taken.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == StatusCode::CONFLICT
    }

    fn body(&self, expose_details: bool) -> ErrorBody {
        let status = self.status_code();
        let message = if status.is_server_error() && !expose_details {
            MASKED_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message,
        }
    }
}

fn db_error_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    status_code: u16,
    message: String,
}

/// Marks a response rendered from an [`AppError`].
#[derive(Debug, Clone, Copy)]
struct ErrorRendered;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let mut res = (status, Json(self.body(true))).into_response();
        res.extensions_mut().insert(ErrorRendered);
        res
    }
}

/// Replaces the message of 5xx error bodies when the state's config hides
/// error details. Installed with `map_response_with_state`.
pub async fn mask_internal_errors(State(state): State<AppState>, res: Response) -> Response {
    let status = res.status();
    if state.config.expose_error_details
        || !status.is_server_error()
        || res.extensions().get::<ErrorRendered>().is_none()
    {
        return res;
    }
    let body = ErrorBody {
        success: false,
        status_code: status.as_u16(),
        message: MASKED_MESSAGE.to_string(),
    };
    let mut masked = (status, Json(body)).into_response();
    masked.extensions_mut().insert(ErrorRendered);
    masked
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
