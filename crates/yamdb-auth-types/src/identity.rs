//! Bearer-token identity parsing.

use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::HeaderMap;

use crate::token::{AuthError, TokenInfo, validate_access_token};

/// Errors returned by [`identity_from_headers`].
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("authorization header is not a bearer token")]
    NotBearer,
    #[error(transparent)]
    Token(#[from] AuthError),
}

/// Identity carried by `Authorization: Bearer <token>`, if any.
///
/// - header absent → `Ok(None)` (anonymous request)
/// - header present and valid → `Ok(Some(info))`
/// - header present but not a bearer token, or the token fails validation →
///   `Err`; callers answer 401 even on endpoints that allow anonymous access
///
/// Synchronous so extractors can resolve it before building their future.
pub fn identity_from_headers(
    headers: &HeaderMap,
    secret: &str,
) -> Result<Option<TokenInfo>, IdentityError> {
    match headers.typed_try_get::<Authorization<Bearer>>() {
        Ok(None) => Ok(None),
        Ok(Some(Authorization(bearer))) => Ok(Some(validate_access_token(bearer.token(), secret)?)),
        Err(_) => Err(IdentityError::NotBearer),
    }
}
