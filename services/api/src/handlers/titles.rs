use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Title, TitleFilter, TitlePatch};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::handlers::actor::CurrentActor;
use crate::handlers::terms::TermResponse;
use crate::state::AppState;
use crate::usecase::title::{
    CreateTitleInput, CreateTitleUseCase, DeleteTitleUseCase, GetTitleUseCase,
    ListTitlesUseCase, UpdateTitleUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TitleResponse {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// `null` until the title has a review.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<TermResponse>,
    pub category: Option<TermResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(TermResponse::from).collect(),
            category: title.category.map(TermResponse::from),
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct TitleListQuery {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub genre: Option<String>,
}

/// `category` is a category slug, `genre` a list of genre slugs.
#[derive(Deserialize)]
pub struct CreateTitleRequest {
    #[serde(default)]
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

// ── GET /api/v1/titles/ ──────────────────────────────────────────────────────

pub async fn list_titles(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(query): Query<TitleListQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TitleResponse>>, ApiError> {
    let uc = ListTitlesUseCase {
        repo: state.title_repo(),
    };
    let filter = TitleFilter {
        name: query.name,
        year: query.year,
        category: query.category,
        genre: query.genre,
    };
    let titles = uc.execute(actor.as_ref(), filter, page).await?;
    Ok(Json(titles.map(TitleResponse::from)))
}

// ── POST /api/v1/titles/ ─────────────────────────────────────────────────────

pub async fn create_title(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTitleRequest>,
) -> Result<(StatusCode, Json<TitleResponse>), ApiError> {
    let uc = CreateTitleUseCase {
        repo: state.title_repo(),
    };
    let title = uc
        .execute(
            actor.as_ref(),
            CreateTitleInput {
                name: body.name,
                year: body.year,
                description: body.description,
                category: body.category,
                genres: body.genre,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(title.into())))
}

// ── GET /api/v1/titles/{title_id}/ ───────────────────────────────────────────

pub async fn get_title(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(title_id): Path<i32>,
) -> Result<Json<TitleResponse>, ApiError> {
    let uc = GetTitleUseCase {
        repo: state.title_repo(),
    };
    let title = uc.execute(actor.as_ref(), title_id).await?;
    Ok(Json(title.into()))
}

// ── PATCH /api/v1/titles/{title_id}/ ─────────────────────────────────────────

pub async fn update_title(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(title_id): Path<i32>,
    JsonBody(body): JsonBody<UpdateTitleRequest>,
) -> Result<Json<TitleResponse>, ApiError> {
    let uc = UpdateTitleUseCase {
        repo: state.title_repo(),
    };
    let patch = TitlePatch {
        name: body.name,
        year: body.year,
        description: body.description,
        category: body.category,
        genres: body.genre,
    };
    let title = uc.execute(actor.as_ref(), title_id, patch).await?;
    Ok(Json(title.into()))
}

// ── DELETE /api/v1/titles/{title_id}/ ────────────────────────────────────────

pub async fn delete_title(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(title_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteTitleUseCase {
        repo: state.title_repo(),
    };
    uc.execute(actor.as_ref(), title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
