pub mod actor;
pub mod auth;
pub mod comments;
pub mod reviews;
pub mod terms;
pub mod titles;
pub mod users;

use axum::extract::FromRequest;
use serde::Deserialize;

use crate::error::ApiError;

/// JSON request body. Malformed or mistyped bodies answer `400 VALIDATION`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `?search=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}
