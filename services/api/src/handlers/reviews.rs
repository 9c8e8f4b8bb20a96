use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::{Page, PageRequest};

use crate::domain::types::Review;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::handlers::actor::CurrentActor;
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, GetReviewUseCase,
    ListReviewsUseCase, UpdateReviewInput, UpdateReviewUseCase,
};

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub text: String,
    /// Author's username.
    pub author: String,
    pub score: i16,
    #[serde(serialize_with = "yamdb_core::serde::to_rfc3339_ms")]
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: review.author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

/// Author, title and publication date are bound server-side; only `text`
/// and `score` are read from the body.
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub text: String,
    pub score: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

// ── GET /api/v1/titles/{title_id}/reviews/ ───────────────────────────────────

pub async fn list_reviews(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(title_id): Path<i32>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ReviewResponse>>, ApiError> {
    let uc = ListReviewsUseCase {
        repo: state.review_repo(),
    };
    let reviews = uc.execute(actor.as_ref(), title_id, page).await?;
    Ok(Json(reviews.map(ReviewResponse::from)))
}

// ── POST /api/v1/titles/{title_id}/reviews/ ──────────────────────────────────

pub async fn create_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(title_id): Path<i32>,
    JsonBody(body): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let uc = CreateReviewUseCase {
        repo: state.review_repo(),
    };
    let review = uc
        .execute(
            actor.as_ref(),
            title_id,
            CreateReviewInput {
                text: body.text,
                score: body.score,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

// ── GET /api/v1/titles/{title_id}/reviews/{review_id}/ ───────────────────────

pub async fn get_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let uc = GetReviewUseCase {
        repo: state.review_repo(),
    };
    let review = uc.execute(actor.as_ref(), title_id, review_id).await?;
    Ok(Json(review.into()))
}

// ── PATCH /api/v1/titles/{title_id}/reviews/{review_id}/ ─────────────────────

pub async fn update_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    JsonBody(body): JsonBody<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let uc = UpdateReviewUseCase {
        repo: state.review_repo(),
    };
    let review = uc
        .execute(
            actor.as_ref(),
            title_id,
            review_id,
            UpdateReviewInput {
                text: body.text,
                score: body.score,
            },
        )
        .await?;
    Ok(Json(review.into()))
}

// ── DELETE /api/v1/titles/{title_id}/reviews/{review_id}/ ────────────────────

pub async fn delete_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteReviewUseCase {
        repo: state.review_repo(),
    };
    uc.execute(actor.as_ref(), title_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
