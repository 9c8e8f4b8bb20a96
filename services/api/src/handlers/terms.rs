//! Category and genre endpoints. Both vocabularies expose the same
//! list / create / delete-by-slug surface.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::Actor;

use crate::domain::types::{Term, TermKind};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::handlers::SearchQuery;
use crate::handlers::actor::CurrentActor;
use crate::state::AppState;
use crate::usecase::term::{
    CreateTermInput, CreateTermUseCase, DeleteTermUseCase, ListTermsUseCase,
};

#[derive(Serialize)]
pub struct TermResponse {
    pub name: String,
    pub slug: String,
}

impl From<Term> for TermResponse {
    fn from(term: Term) -> Self {
        Self {
            name: term.name,
            slug: term.slug,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTermRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

async fn list_terms(
    kind: TermKind,
    state: &AppState,
    actor: Option<&Actor>,
    search: SearchQuery,
    page: PageRequest,
) -> Result<Json<Page<TermResponse>>, ApiError> {
    let uc = ListTermsUseCase {
        repo: state.term_repo(kind),
    };
    let terms = uc.execute(actor, search.search.as_deref(), page).await?;
    Ok(Json(terms.map(TermResponse::from)))
}

async fn create_term(
    kind: TermKind,
    state: &AppState,
    actor: Option<&Actor>,
    body: CreateTermRequest,
) -> Result<(StatusCode, Json<TermResponse>), ApiError> {
    let uc = CreateTermUseCase {
        repo: state.term_repo(kind),
    };
    let term = uc
        .execute(
            actor,
            CreateTermInput {
                name: body.name,
                slug: body.slug,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(term.into())))
}

async fn delete_term(
    kind: TermKind,
    state: &AppState,
    actor: Option<&Actor>,
    slug: &str,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteTermUseCase {
        repo: state.term_repo(kind),
    };
    uc.execute(actor, slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── /api/v1/categories/ ──────────────────────────────────────────────────────

pub async fn list_categories(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TermResponse>>, ApiError> {
    list_terms(TermKind::Category, &state, actor.as_ref(), search, page).await
}

pub async fn create_category(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTermRequest>,
) -> Result<(StatusCode, Json<TermResponse>), ApiError> {
    create_term(TermKind::Category, &state, actor.as_ref(), body).await
}

pub async fn delete_category(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_term(TermKind::Category, &state, actor.as_ref(), &slug).await
}

// ── /api/v1/genres/ ──────────────────────────────────────────────────────────

pub async fn list_genres(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TermResponse>>, ApiError> {
    list_terms(TermKind::Genre, &state, actor.as_ref(), search, page).await
}

pub async fn create_genre(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTermRequest>,
) -> Result<(StatusCode, Json<TermResponse>), ApiError> {
    create_term(TermKind::Genre, &state, actor.as_ref(), body).await
}

pub async fn delete_genre(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_term(TermKind::Genre, &state, actor.as_ref(), &slug).await
}
