use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use yamdb_domain::access::Denied;

use crate::domain::validation::FieldErrors;

/// API error variants. Every handler returns this type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("you have already reviewed this title")]
    ReviewAlreadyExists,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("slug already exists")]
    SlugAlreadyExists,
    #[error("invalid confirmation code")]
    InvalidConfirmationCode,
    #[error("title not found")]
    TitleNotFound,
    #[error("review not found")]
    ReviewNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("genre not found")]
    GenreNotFound,
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::ReviewAlreadyExists => "REVIEW_ALREADY_EXISTS",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::SlugAlreadyExists => "SLUG_ALREADY_EXISTS",
            Self::InvalidConfirmationCode => "INVALID_CONFIRMATION_CODE",
            Self::TitleNotFound => "TITLE_NOT_FOUND",
            Self::ReviewNotFound => "REVIEW_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::GenreNotFound => "GENRE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Validation error for a single field.
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<Denied> for ApiError {
    fn from(denied: Denied) -> Self {
        match denied {
            Denied::Unauthenticated => Self::Unauthorized,
            Denied::Forbidden => Self::Forbidden,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::field("non_field_errors", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_)
            | Self::ReviewAlreadyExists
            | Self::UserAlreadyExists
            | Self::SlugAlreadyExists
            | Self::InvalidConfirmationCode => StatusCode::BAD_REQUEST,
            Self::TitleNotFound
            | Self::ReviewNotFound
            | Self::CommentNotFound
            | Self::UserNotFound
            | Self::CategoryNotFound
            | Self::GenreNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(ref fields) = self {
            body["fields"] = serde_json::to_value(fields).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}
