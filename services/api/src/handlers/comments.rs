use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::{Page, PageRequest};

use crate::domain::types::Comment;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::handlers::actor::CurrentActor;
use crate::state::AppState;
use crate::usecase::comment::{
    CreateCommentUseCase, DeleteCommentUseCase, GetCommentUseCase, ListCommentsUseCase,
    UpdateCommentUseCase,
};

#[derive(Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub text: String,
    pub author: String,
    #[serde(serialize_with = "yamdb_core::serde::to_rfc3339_ms")]
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author,
            pub_date: comment.pub_date,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

// ── GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/ ──────────────

pub async fn list_comments(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<CommentResponse>>, ApiError> {
    let uc = ListCommentsUseCase {
        repo: state.comment_repo(),
    };
    let comments = uc.execute(actor.as_ref(), title_id, review_id, page).await?;
    Ok(Json(comments.map(CommentResponse::from)))
}

// ── POST /api/v1/titles/{title_id}/reviews/{review_id}/comments/ ─────────────

pub async fn create_comment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    JsonBody(body): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let uc = CreateCommentUseCase {
        repo: state.comment_repo(),
    };
    let comment = uc
        .execute(actor.as_ref(), title_id, review_id, body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/ ─

pub async fn get_comment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<Json<CommentResponse>, ApiError> {
    let uc = GetCommentUseCase {
        repo: state.comment_repo(),
    };
    let comment = uc
        .execute(actor.as_ref(), title_id, review_id, comment_id)
        .await?;
    Ok(Json(comment.into()))
}

// ── PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/

pub async fn update_comment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
    JsonBody(body): JsonBody<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let uc = UpdateCommentUseCase {
        repo: state.comment_repo(),
    };
    let comment = uc
        .execute(actor.as_ref(), title_id, review_id, comment_id, body.text)
        .await?;
    Ok(Json(comment.into()))
}

// ── DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/

pub async fn delete_comment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteCommentUseCase {
        repo: state.comment_repo(),
    };
    uc.execute(actor.as_ref(), title_id, review_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
