use yamdb_domain::access::{Verb, authorize};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::repository::TermRepository;
use crate::domain::types::{Term, TermKind};
use crate::domain::validation::{
    FieldErrors, TERM_NAME_MAX_LEN, validate_required_text, validate_slug,
};
use crate::error::ApiError;

fn not_found(kind: TermKind) -> ApiError {
    match kind {
        TermKind::Category => ApiError::CategoryNotFound,
        TermKind::Genre => ApiError::GenreNotFound,
    }
}

// ── ListTerms ────────────────────────────────────────────────────────────────

pub struct ListTermsUseCase<R: TermRepository> {
    pub repo: R,
}

impl<R: TermRepository> ListTermsUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Term>, ApiError> {
        authorize(actor, Verb::List, self.repo.kind().resource(), None)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.list(search, page).await
    }
}

// ── CreateTerm ───────────────────────────────────────────────────────────────

pub struct CreateTermInput {
    pub name: String,
    pub slug: String,
}

pub struct CreateTermUseCase<R: TermRepository> {
    pub repo: R,
}

impl<R: TermRepository> CreateTermUseCase<R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        input: CreateTermInput,
    ) -> Result<Term, ApiError> {
        authorize(actor, Verb::Create, self.repo.kind().resource(), None)?;

        let mut errors = FieldErrors::default();
        validate_required_text("name", &input.name, Some(TERM_NAME_MAX_LEN), &mut errors);
        validate_slug("slug", &input.slug, &mut errors);
        errors.into_result()?;

        self.repo.create(&input.name, &input.slug).await
    }
}

// ── DeleteTerm ───────────────────────────────────────────────────────────────

pub struct DeleteTermUseCase<R: TermRepository> {
    pub repo: R,
}

impl<R: TermRepository> DeleteTermUseCase<R> {
    pub async fn execute(&self, actor: Option<&Actor>, slug: &str) -> Result<(), ApiError> {
        let kind = self.repo.kind();
        authorize(actor, Verb::Delete, kind.resource(), None)?;
        if !self.repo.delete_by_slug(slug).await? {
            return Err(not_found(kind));
        }
        Ok(())
    }
}
