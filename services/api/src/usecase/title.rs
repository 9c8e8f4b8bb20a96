use yamdb_domain::access::{Resource, Verb, authorize};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::repository::TitleRepository;
use crate::domain::types::{NewTitle, Title, TitleFilter, TitlePatch};
use crate::domain::validation::{
    FieldErrors, TITLE_DESCRIPTION_MAX_LEN, TITLE_NAME_MAX_LEN, validate_max_len,
    validate_required_text, validate_slug, validate_year,
};
use crate::error::ApiError;

fn validate_slugs(category: Option<&str>, genres: Option<&[String]>, errors: &mut FieldErrors) {
    if let Some(slug) = category {
        validate_slug("category", slug, errors);
    }
    for slug in genres.unwrap_or_default() {
        validate_slug("genre", slug, errors);
    }
}

// ── ListTitles ───────────────────────────────────────────────────────────────

pub struct ListTitlesUseCase<R: TitleRepository> {
    pub repo: R,
}

impl<R: TitleRepository> ListTitlesUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<Page<Title>, ApiError> {
        authorize(actor, Verb::List, Resource::Title, None)?;
        self.repo.list(&filter, page).await
    }
}

// ── GetTitle ─────────────────────────────────────────────────────────────────

pub struct GetTitleUseCase<R: TitleRepository> {
    pub repo: R,
}

impl<R: TitleRepository> GetTitleUseCase<R> {
    pub async fn execute(&self, actor: Option<&Actor>, id: i32) -> Result<Title, ApiError> {
        authorize(actor, Verb::Retrieve, Resource::Title, None)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::TitleNotFound)
    }
}

// ── CreateTitle ──────────────────────────────────────────────────────────────

pub struct CreateTitleInput {
    pub name: String,
    /// `None` when the request omitted it.
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Vec<String>,
}

pub struct CreateTitleUseCase<R: TitleRepository> {
    pub repo: R,
}

impl<R: TitleRepository> CreateTitleUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        input: CreateTitleInput,
    ) -> Result<Title, ApiError> {
        authorize(actor, Verb::Create, Resource::Title, None)?;

        let mut errors = FieldErrors::default();
        validate_required_text("name", &input.name, Some(TITLE_NAME_MAX_LEN), &mut errors);
        match input.year {
            Some(year) => validate_year(year, &mut errors),
            None => errors.add("year", "this field is required"),
        }
        if let Some(description) = &input.description {
            validate_max_len(
                "description",
                description,
                Some(TITLE_DESCRIPTION_MAX_LEN),
                &mut errors,
            );
        }
        validate_slugs(input.category.as_deref(), Some(&input.genres), &mut errors);
        let (Some(year), true) = (input.year, errors.is_empty()) else {
            return Err(ApiError::Validation(errors));
        };

        let title = NewTitle {
            name: input.name,
            year,
            description: input.description,
            category: input.category,
            genres: input.genres,
        };
        self.repo.create(&title).await
    }
}

// ── UpdateTitle ──────────────────────────────────────────────────────────────

pub struct UpdateTitleUseCase<R: TitleRepository> {
    pub repo: R,
}

impl<R: TitleRepository> UpdateTitleUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        id: i32,
        patch: TitlePatch,
    ) -> Result<Title, ApiError> {
        authorize(actor, Verb::Update, Resource::Title, None)?;

        let mut errors = FieldErrors::default();
        if let Some(name) = &patch.name {
            validate_required_text("name", name, Some(TITLE_NAME_MAX_LEN), &mut errors);
        }
        if let Some(year) = patch.year {
            validate_year(year, &mut errors);
        }
        if let Some(description) = &patch.description {
            validate_max_len(
                "description",
                description,
                Some(TITLE_DESCRIPTION_MAX_LEN),
                &mut errors,
            );
        }
        validate_slugs(patch.category.as_deref(), patch.genres.as_deref(), &mut errors);
        errors.into_result()?;

        self.repo
            .update(id, &patch)
            .await?
            .ok_or(ApiError::TitleNotFound)
    }
}

// ── DeleteTitle ──────────────────────────────────────────────────────────────

pub struct DeleteTitleUseCase<R: TitleRepository> {
    pub repo: R,
}

impl<R: TitleRepository> DeleteTitleUseCase<R> {
    pub async fn execute(&self, actor: Option<&Actor>, id: i32) -> Result<(), ApiError> {
        authorize(actor, Verb::Delete, Resource::Title, None)?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::TitleNotFound);
        }
        Ok(())
    }
}
