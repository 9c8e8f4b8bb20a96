#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use yamdb_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Comment, NewTitle, NewUser, OutgoingMail, Review, Term, TermKind, Title, TitleFilter,
    TitlePatch, User, UserPatch,
};
use crate::error::ApiError;

/// Repository for one slug-addressed vocabulary (categories or genres).
pub trait TermRepository: Send + Sync {
    fn kind(&self) -> TermKind;

    /// Terms ordered by name, optionally narrowed to names containing
    /// `search` (case-insensitive).
    async fn list(&self, search: Option<&str>, page: PageRequest)
    -> Result<Page<Term>, ApiError>;

    /// Fails with `SlugAlreadyExists` when the slug is taken.
    async fn create(&self, name: &str, slug: &str) -> Result<Term, ApiError>;

    /// Delete by slug. Returns `true` if a row was deleted.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, ApiError>;
}

/// Repository for titles. Reads return hydrated titles with their rating.
pub trait TitleRepository: Send + Sync {
    async fn list(&self, filter: &TitleFilter, page: PageRequest)
    -> Result<Page<Title>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ApiError>;

    /// Unknown category or genre slugs fail with a validation error.
    async fn create(&self, title: &NewTitle) -> Result<Title, ApiError>;

    /// Returns `None` if the title does not exist.
    async fn update(&self, id: i32, patch: &TitlePatch) -> Result<Option<Title>, ApiError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// Repository for reviews, always scoped to their title.
pub trait ReviewRepository: Send + Sync {
    async fn title_exists(&self, title_id: i32) -> Result<bool, ApiError>;

    /// Reviews of a title, newest first.
    async fn list(&self, title_id: i32, page: PageRequest) -> Result<Page<Review>, ApiError>;

    async fn find(&self, title_id: i32, review_id: i32) -> Result<Option<Review>, ApiError>;

    /// Insert a review in one transaction: `TitleNotFound` if the title is
    /// gone, `ReviewAlreadyExists` if the author already reviewed it.
    async fn create(
        &self,
        title_id: i32,
        author_id: i32,
        text: &str,
        score: i16,
    ) -> Result<Review, ApiError>;

    async fn update(
        &self,
        review_id: i32,
        text: Option<&str>,
        score: Option<i16>,
    ) -> Result<Option<Review>, ApiError>;

    async fn delete(&self, review_id: i32) -> Result<bool, ApiError>;
}

/// Repository for comments, always scoped to their review and title.
pub trait CommentRepository: Send + Sync {
    async fn review_exists(&self, title_id: i32, review_id: i32) -> Result<bool, ApiError>;

    /// Comments of a review, newest first.
    async fn list(&self, review_id: i32, page: PageRequest) -> Result<Page<Comment>, ApiError>;

    async fn find(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<Option<Comment>, ApiError>;

    /// Insert a comment in one transaction: `ReviewNotFound` unless the
    /// review exists under `title_id`.
    async fn create(
        &self,
        title_id: i32,
        review_id: i32,
        author_id: i32,
        text: &str,
    ) -> Result<Comment, ApiError>;

    async fn update(&self, comment_id: i32, text: &str) -> Result<Option<Comment>, ApiError>;

    async fn delete(&self, comment_id: i32) -> Result<bool, ApiError>;
}

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Users ordered by username, optionally narrowed to usernames
    /// containing `search` (case-insensitive).
    async fn list(&self, search: Option<&str>, page: PageRequest)
    -> Result<Page<User>, ApiError>;

    /// Fails with `UserAlreadyExists` on a username or email collision.
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;

    /// Returns `None` if the user does not exist. Fails with
    /// `UserAlreadyExists` on a username or email collision.
    async fn update(&self, id: i32, patch: &UserPatch) -> Result<Option<User>, ApiError>;

    async fn delete_by_username(&self, username: &str) -> Result<bool, ApiError>;

    async fn touch_last_login(&self, id: i32, at: DateTime<Utc>) -> Result<(), ApiError>;
}

/// Outbound mail. Delivery is fire-and-forget: `send` returns at once and
/// failures are only logged.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail);
}
