use yamdb_domain::access::{Resource, Verb, authorize};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::repository::ReviewRepository;
use crate::domain::types::Review;
use crate::domain::validation::{FieldErrors, validate_required_text, validate_score};
use crate::error::ApiError;

/// Look up a review inside its title, telling a missing title apart from a
/// missing review.
async fn find_scoped<R: ReviewRepository>(
    repo: &R,
    title_id: i32,
    review_id: i32,
) -> Result<Review, ApiError> {
    match repo.find(title_id, review_id).await? {
        Some(review) => Ok(review),
        None if repo.title_exists(title_id).await? => Err(ApiError::ReviewNotFound),
        None => Err(ApiError::TitleNotFound),
    }
}

// ── ListReviews ──────────────────────────────────────────────────────────────

pub struct ListReviewsUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> ListReviewsUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        page: PageRequest,
    ) -> Result<Page<Review>, ApiError> {
        authorize(actor, Verb::List, Resource::Review, None)?;
        if !self.repo.title_exists(title_id).await? {
            return Err(ApiError::TitleNotFound);
        }
        self.repo.list(title_id, page).await
    }
}

// ── GetReview ────────────────────────────────────────────────────────────────

pub struct GetReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> GetReviewUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
    ) -> Result<Review, ApiError> {
        authorize(actor, Verb::Retrieve, Resource::Review, None)?;
        find_scoped(&self.repo, title_id, review_id).await
    }
}

// ── CreateReview ─────────────────────────────────────────────────────────────

pub struct CreateReviewInput {
    pub text: String,
    /// `None` when the request omitted it.
    pub score: Option<i64>,
}

pub struct CreateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> CreateReviewUseCase<R> {
    /// Author and title come from the request context, never from the body.
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        input: CreateReviewInput,
    ) -> Result<Review, ApiError> {
        authorize(actor, Verb::Create, Resource::Review, None)?;
        let actor = actor.ok_or(ApiError::Unauthorized)?;

        let mut errors = FieldErrors::default();
        validate_required_text("text", &input.text, None, &mut errors);
        let score = match input.score {
            Some(score) => validate_score(score, &mut errors),
            None => {
                errors.add("score", "this field is required");
                None
            }
        };
        let (Some(score), true) = (score, errors.is_empty()) else {
            return Err(ApiError::Validation(errors));
        };

        self.repo
            .create(title_id, actor.user_id, &input.text, score)
            .await
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateReviewInput {
    pub text: Option<String>,
    pub score: Option<i64>,
}

pub struct UpdateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> UpdateReviewUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        input: UpdateReviewInput,
    ) -> Result<Review, ApiError> {
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        let review = find_scoped(&self.repo, title_id, review_id).await?;
        authorize(
            Some(actor),
            Verb::Update,
            Resource::Review,
            Some(review.author_id),
        )?;

        let mut errors = FieldErrors::default();
        if let Some(text) = &input.text {
            validate_required_text("text", text, None, &mut errors);
        }
        let score = input
            .score
            .and_then(|score| validate_score(score, &mut errors));
        errors.into_result()?;

        self.repo
            .update(review.id, input.text.as_deref(), score)
            .await?
            .ok_or(ApiError::ReviewNotFound)
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> DeleteReviewUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
    ) -> Result<(), ApiError> {
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        let review = find_scoped(&self.repo, title_id, review_id).await?;
        authorize(
            Some(actor),
            Verb::Delete,
            Resource::Review,
            Some(review.author_id),
        )?;
        if !self.repo.delete(review.id).await? {
            return Err(ApiError::ReviewNotFound);
        }
        Ok(())
    }
}
