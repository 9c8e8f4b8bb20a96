use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use yamdb_auth_types::identity::identity_from_headers;
use yamdb_domain::user::Actor;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::actor::ResolveActorUseCase;

/// The request's actor: `None` for anonymous requests.
///
/// A bearer token that fails validation, or whose user no longer exists, is
/// rejected with 401 even on endpoints that allow anonymous access.
pub struct CurrentActor(pub Option<Actor>);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers, &state.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            ApiError::Unauthorized
        })?;
        let Some(identity) = identity else {
            return Ok(Self(None));
        };
        let uc = ResolveActorUseCase {
            users: state.user_repo(),
        };
        Ok(Self(Some(uc.execute(identity.user_id).await?)))
    }
}
