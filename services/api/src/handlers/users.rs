use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::UserRole;

use crate::domain::types::{NewUser, User, UserPatch};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::handlers::SearchQuery;
use crate::handlers::actor::CurrentActor;
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserUseCase, DeleteUserUseCase, GetMeUseCase, GetUserUseCase, ListUsersUseCase,
    UpdateMeUseCase, UpdateUserUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(body: UpdateUserRequest) -> Self {
        Self {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            bio: body.bio,
            role: body.role,
        }
    }
}

/// Profile fields a user may change on themselves. A `role` key in the body
/// is ignored.
#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl From<UpdateMeRequest> for UserPatch {
    fn from(body: UpdateMeRequest) -> Self {
        Self {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            bio: body.bio,
            role: None,
        }
    }
}

// ── GET /api/v1/users/ ───────────────────────────────────────────────────────

pub async fn list_users(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let uc = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = uc
        .execute(actor.as_ref(), search.search.as_deref(), page)
        .await?;
    Ok(Json(users.map(UserResponse::from)))
}

// ── POST /api/v1/users/ ──────────────────────────────────────────────────────

pub async fn create_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let uc = CreateUserUseCase {
        users: state.user_repo(),
    };
    let input = NewUser {
        username: body.username,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        bio: body.bio,
        role: body.role,
    };
    let user = uc.execute(actor.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /api/v1/users/me/ ────────────────────────────────────────────────────

pub async fn get_me(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(actor.as_ref()).await?;
    Ok(Json(user.into()))
}

// ── PATCH /api/v1/users/me/ ──────────────────────────────────────────────────

pub async fn update_me(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = UpdateMeUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(actor.as_ref(), body.into()).await?;
    Ok(Json(user.into()))
}

// ── GET /api/v1/users/{username}/ ────────────────────────────────────────────

pub async fn get_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(actor.as_ref(), &username).await?;
    Ok(Json(user.into()))
}

// ── PATCH /api/v1/users/{username}/ ──────────────────────────────────────────

pub async fn update_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(username): Path<String>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(actor.as_ref(), &username, body.into()).await?;
    Ok(Json(user.into()))
}

// ── DELETE /api/v1/users/{username}/ ─────────────────────────────────────────

pub async fn delete_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteUserUseCase {
        users: state.user_repo(),
    };
    uc.execute(actor.as_ref(), &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
