use yamdb_domain::access::{Resource, Verb, authorize};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::repository::CommentRepository;
use crate::domain::types::Comment;
use crate::domain::validation::{FieldErrors, validate_required_text};
use crate::error::ApiError;

async fn find_scoped<R: CommentRepository>(
    repo: &R,
    title_id: i32,
    review_id: i32,
    comment_id: i32,
) -> Result<Comment, ApiError> {
    match repo.find(title_id, review_id, comment_id).await? {
        Some(comment) => Ok(comment),
        None if repo.review_exists(title_id, review_id).await? => {
            Err(ApiError::CommentNotFound)
        }
        None => Err(ApiError::ReviewNotFound),
    }
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    validate_required_text("text", text, None, &mut errors);
    errors.into_result()
}

// ── ListComments ─────────────────────────────────────────────────────────────

pub struct ListCommentsUseCase<R: CommentRepository> {
    pub repo: R,
}

impl<R: CommentRepository> ListCommentsUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Page<Comment>, ApiError> {
        authorize(actor, Verb::List, Resource::Comment, None)?;
        if !self.repo.review_exists(title_id, review_id).await? {
            return Err(ApiError::ReviewNotFound);
        }
        self.repo.list(review_id, page).await
    }
}

// ── GetComment ───────────────────────────────────────────────────────────────

pub struct GetCommentUseCase<R: CommentRepository> {
    pub repo: R,
}

impl<R: CommentRepository> GetCommentUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<Comment, ApiError> {
        authorize(actor, Verb::Retrieve, Resource::Comment, None)?;
        find_scoped(&self.repo, title_id, review_id, comment_id).await
    }
}

// ── CreateComment ────────────────────────────────────────────────────────────

pub struct CreateCommentUseCase<R: CommentRepository> {
    pub repo: R,
}

impl<R: CommentRepository> CreateCommentUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        text: String,
    ) -> Result<Comment, ApiError> {
        authorize(actor, Verb::Create, Resource::Comment, None)?;
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        validate_text(&text)?;
        self.repo
            .create(title_id, review_id, actor.user_id, &text)
            .await
    }
}

// ── UpdateComment ────────────────────────────────────────────────────────────

pub struct UpdateCommentUseCase<R: CommentRepository> {
    pub repo: R,
}

impl<R: CommentRepository> UpdateCommentUseCase<R> {
    /// `text: None` leaves the comment unchanged and returns it as stored.
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        text: Option<String>,
    ) -> Result<Comment, ApiError> {
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        let comment = find_scoped(&self.repo, title_id, review_id, comment_id).await?;
        authorize(
            Some(actor),
            Verb::Update,
            Resource::Comment,
            Some(comment.author_id),
        )?;
        let Some(text) = text else {
            return Ok(comment);
        };
        validate_text(&text)?;
        self.repo
            .update(comment.id, &text)
            .await?
            .ok_or(ApiError::CommentNotFound)
    }
}

// ── DeleteComment ────────────────────────────────────────────────────────────

pub struct DeleteCommentUseCase<R: CommentRepository> {
    pub repo: R,
}

impl<R: CommentRepository> DeleteCommentUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ApiError> {
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        let comment = find_scoped(&self.repo, title_id, review_id, comment_id).await?;
        authorize(
            Some(actor),
            Verb::Delete,
            Resource::Comment,
            Some(comment.author_id),
        )?;
        if !self.repo.delete(comment.id).await? {
            return Err(ApiError::CommentNotFound);
        }
        Ok(())
    }
}
