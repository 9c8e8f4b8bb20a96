use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;
use crate::usecase::signup::{SignupInput, SignupUseCase};
use crate::usecase::token::{IssueTokenInput, IssueTokenUseCase};

// ── POST /api/v1/auth/signup/ ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let uc = SignupUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
        codes: state.codes.clone(),
    };
    let user = uc
        .execute(SignupInput {
            username: body.username,
            email: body.email,
        })
        .await?;
    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

// ── POST /api/v1/auth/token/ ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub confirmation_code: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let uc = IssueTokenUseCase {
        users: state.user_repo(),
        codes: state.codes.clone(),
        jwt_secret: state.jwt_secret.clone(),
        access_token_ttl_secs: state.access_token_ttl_secs,
    };
    let token = uc
        .execute(IssueTokenInput {
            username: body.username,
            confirmation_code: body.confirmation_code,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}
