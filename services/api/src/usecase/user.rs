use yamdb_domain::access::{Resource, Verb, authorize};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, User, UserPatch};
use crate::domain::validation::{
    FieldErrors, PERSON_NAME_MAX_LEN, validate_email, validate_max_len, validate_username,
};
use crate::error::ApiError;

fn validate_patch(patch: &UserPatch) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    if let Some(username) = &patch.username {
        validate_username(username, &mut errors);
    }
    if let Some(email) = &patch.email {
        validate_email(email, &mut errors);
    }
    if let Some(first_name) = &patch.first_name {
        validate_max_len("first_name", first_name, Some(PERSON_NAME_MAX_LEN), &mut errors);
    }
    if let Some(last_name) = &patch.last_name {
        validate_max_len("last_name", last_name, Some(PERSON_NAME_MAX_LEN), &mut errors);
    }
    errors.into_result()
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, ApiError> {
        authorize(actor, Verb::List, Resource::User, None)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.users.list(search, page).await
    }
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>, input: NewUser) -> Result<User, ApiError> {
        authorize(actor, Verb::Create, Resource::User, None)?;

        let mut errors = FieldErrors::default();
        validate_username(&input.username, &mut errors);
        validate_email(&input.email, &mut errors);
        validate_max_len(
            "first_name",
            &input.first_name,
            Some(PERSON_NAME_MAX_LEN),
            &mut errors,
        );
        validate_max_len(
            "last_name",
            &input.last_name,
            Some(PERSON_NAME_MAX_LEN),
            &mut errors,
        );
        errors.into_result()?;

        self.users.create(&input).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>, username: &str) -> Result<User, ApiError> {
        authorize(actor, Verb::Retrieve, Resource::User, None)?;
        self.users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        username: &str,
        patch: UserPatch,
    ) -> Result<User, ApiError> {
        authorize(actor, Verb::Update, Resource::User, None)?;
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        validate_patch(&patch)?;
        self.users
            .update(user.id, &patch)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    /// Reviews and comments of the user go with it.
    pub async fn execute(&self, actor: Option<&Actor>, username: &str) -> Result<(), ApiError> {
        authorize(actor, Verb::Delete, Resource::User, None)?;
        if !self.users.delete_by_username(username).await? {
            return Err(ApiError::UserNotFound);
        }
        Ok(())
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>) -> Result<User, ApiError> {
        authorize(actor, Verb::Retrieve, Resource::Me, None)?;
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        self.users
            .find_by_id(actor.user_id)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

pub struct UpdateMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateMeUseCase<U> {
    /// The role is self-immutable: any `role` in `patch` is dropped and the
    /// stored role is kept.
    pub async fn execute(&self, actor: Option<&Actor>, patch: UserPatch) -> Result<User, ApiError> {
        authorize(actor, Verb::Update, Resource::Me, None)?;
        let actor = actor.ok_or(ApiError::Unauthorized)?;
        let patch = UserPatch {
            role: None,
            ..patch
        };
        validate_patch(&patch)?;
        self.users
            .update(actor.user_id, &patch)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}
