use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr, TransactionTrait,
    sea_query::{Alias, Expr, Func, Query, SimpleExpr},
};

use yamdb_api_schema::{categories, comments, genres, reviews, title_genres, titles, users};
use yamdb_domain::pagination::{Page, PageRequest};
use yamdb_domain::user::UserRole;

use crate::domain::repository::{
    CommentRepository, ReviewRepository, TermRepository, TitleRepository, UserRepository,
};
use crate::domain::types::{
    Comment, NewTitle, NewUser, Review, Term, TermKind, Title, TitleFilter, TitlePatch, User,
    UserPatch,
};
use crate::domain::validation::FieldErrors;
use crate::error::ApiError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a unique-constraint violation to `on_conflict`, anything else to an
/// internal error carrying `context`.
fn conflict_or_internal(err: DbErr, on_conflict: ApiError, context: &'static str) -> ApiError {
    if is_unique_violation(&err) {
        on_conflict
    } else {
        ApiError::Internal(anyhow::Error::new(err).context(context))
    }
}

/// `%needle%` with LIKE wildcards escaped, lower-cased for matching against
/// `lower(column)`.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive substring match on a text column.
fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column.as_column_ref()))).like(like_pattern(needle))
}

// ── Term repository (categories / genres) ────────────────────────────────────

fn category_term(model: categories::Model) -> Term {
    Term {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

fn genre_term(model: genres::Model) -> Term {
    Term {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

/// One page of `query`, ordered by name then id.
async fn term_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    (name, id): (E::Column, E::Column),
    page: PageRequest,
    to_term: fn(E::Model) -> Term,
) -> Result<Page<Term>, ApiError>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let count = query.clone().count(db).await.context("count terms")?;
    let models = query
        .order_by_asc(name)
        .order_by_asc(id)
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await
        .context("list terms")?;
    Ok(Page {
        count,
        results: models.into_iter().map(to_term).collect(),
    })
}

/// Categories and genres share one shape, so one repository serves both,
/// keyed by `kind`.
#[derive(Clone)]
pub struct DbTermRepository {
    pub db: DatabaseConnection,
    pub kind: TermKind,
}

impl TermRepository for DbTermRepository {
    fn kind(&self) -> TermKind {
        self.kind
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Term>, ApiError> {
        match self.kind {
            TermKind::Category => {
                let mut query = categories::Entity::find();
                if let Some(search) = search {
                    query = query.filter(contains_ci(categories::Column::Name, search));
                }
                let order = (categories::Column::Name, categories::Column::Id);
                term_page(&self.db, query, order, page, category_term).await
            }
            TermKind::Genre => {
                let mut query = genres::Entity::find();
                if let Some(search) = search {
                    query = query.filter(contains_ci(genres::Column::Name, search));
                }
                let order = (genres::Column::Name, genres::Column::Id);
                term_page(&self.db, query, order, page, genre_term).await
            }
        }
    }

    async fn create(&self, name: &str, slug: &str) -> Result<Term, ApiError> {
        let inserted = match self.kind {
            TermKind::Category => categories::ActiveModel {
                name: Set(name.to_owned()),
                slug: Set(slug.to_owned()),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map(category_term),
            TermKind::Genre => genres::ActiveModel {
                name: Set(name.to_owned()),
                slug: Set(slug.to_owned()),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map(genre_term),
        };
        inserted.map_err(|e| conflict_or_internal(e, ApiError::SlugAlreadyExists, "create term"))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, ApiError> {
        let result = match self.kind {
            TermKind::Category => {
                categories::Entity::delete_many()
                    .filter(categories::Column::Slug.eq(slug))
                    .exec(&self.db)
                    .await
            }
            TermKind::Genre => {
                genres::Entity::delete_many()
                    .filter(genres::Column::Slug.eq(slug))
                    .exec(&self.db)
                    .await
            }
        }
        .context("delete term")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Title repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTitleRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    title_id: i32,
    rating: Option<f64>,
}

/// `AVG(score)` per title, for the given titles only.
async fn ratings<C: ConnectionTrait>(
    db: &C,
    title_ids: &[i32],
) -> Result<HashMap<i32, f64>, ApiError> {
    let average = SimpleExpr::from(Func::cast_as(
        Func::avg(Expr::col(reviews::Column::Score)),
        Alias::new("float8"),
    ));
    let rows = reviews::Entity::find()
        .select_only()
        .column(reviews::Column::TitleId)
        .column_as(average, "rating")
        .filter(reviews::Column::TitleId.is_in(title_ids.iter().copied()))
        .group_by(reviews::Column::TitleId)
        .into_model::<RatingRow>()
        .all(db)
        .await
        .context("aggregate title ratings")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.rating.map(|rating| (row.title_id, rating)))
        .collect())
}

/// Attach category, genres and rating to title rows, keeping their order.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    models: Vec<titles::Model>,
) -> Result<Vec<Title>, ApiError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let title_ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let category_ids: Vec<i32> = models.iter().filter_map(|m| m.category_id).collect();
    let categories_by_id: HashMap<i32, Term> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .context("load title categories")?
            .into_iter()
            .map(|c| (c.id, category_term(c)))
            .collect()
    };

    let mut genres_by_title: HashMap<i32, Vec<Term>> = HashMap::new();
    let links = title_genres::Entity::find()
        .filter(title_genres::Column::TitleId.is_in(title_ids.iter().copied()))
        .find_also_related(genres::Entity)
        .order_by_asc(genres::Column::Name)
        .all(db)
        .await
        .context("load title genres")?;
    for (link, genre) in links {
        if let Some(genre) = genre {
            genres_by_title
                .entry(link.title_id)
                .or_default()
                .push(genre_term(genre));
        }
    }

    let ratings_by_title = ratings(db, &title_ids).await?;

    Ok(models
        .into_iter()
        .map(|m| Title {
            id: m.id,
            name: m.name,
            year: m.year,
            description: m.description,
            category: m
                .category_id
                .and_then(|id| categories_by_id.get(&id).cloned()),
            genres: genres_by_title.remove(&m.id).unwrap_or_default(),
            rating: ratings_by_title.get(&m.id).copied(),
        })
        .collect())
}

async fn resolve_category<C: ConnectionTrait>(
    db: &C,
    slug: Option<&str>,
) -> Result<Option<i32>, ApiError> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    let category = categories::Entity::find()
        .filter(categories::Column::Slug.eq(slug))
        .one(db)
        .await
        .context("resolve category slug")?;
    match category {
        Some(category) => Ok(Some(category.id)),
        None => Err(ApiError::field(
            "category",
            format!("unknown category \"{slug}\""),
        )),
    }
}

async fn resolve_genres<C: ConnectionTrait>(db: &C, slugs: &[String]) -> Result<Vec<i32>, ApiError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let found = genres::Entity::find()
        .filter(genres::Column::Slug.is_in(slugs.iter().map(String::as_str)))
        .all(db)
        .await
        .context("resolve genre slugs")?;
    let mut errors = FieldErrors::default();
    for slug in slugs {
        if !found.iter().any(|g| &g.slug == slug) {
            errors.add("genre", format!("unknown genre \"{slug}\""));
        }
    }
    errors.into_result()?;
    Ok(found.into_iter().map(|g| g.id).collect())
}

async fn link_genres<C: ConnectionTrait>(
    db: &C,
    title_id: i32,
    genre_ids: &[i32],
) -> Result<(), ApiError> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    title_genres::Entity::insert_many(genre_ids.iter().map(|&genre_id| {
        title_genres::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(genre_id),
        }
    }))
    .exec_without_returning(db)
    .await
    .context("link title genres")?;
    Ok(())
}

impl TitleRepository for DbTitleRepository {
    async fn list(&self, filter: &TitleFilter, page: PageRequest) -> Result<Page<Title>, ApiError> {
        let mut query = titles::Entity::find();
        if let Some(name) = filter.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(contains_ci(titles::Column::Name, name));
        }
        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }
        if let Some(slug) = filter.category.as_deref() {
            query = query.filter(
                titles::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(categories::Column::Id)
                        .from(categories::Entity)
                        .and_where(categories::Column::Slug.eq(slug))
                        .to_owned(),
                ),
            );
        }
        if let Some(slug) = filter.genre.as_deref() {
            query = query.filter(
                titles::Column::Id.in_subquery(
                    Query::select()
                        .column((title_genres::Entity, title_genres::Column::TitleId))
                        .from(title_genres::Entity)
                        .inner_join(
                            genres::Entity,
                            Expr::col((genres::Entity, genres::Column::Id))
                                .equals((title_genres::Entity, title_genres::Column::GenreId)),
                        )
                        .and_where(Expr::col((genres::Entity, genres::Column::Slug)).eq(slug))
                        .to_owned(),
                ),
            );
        }

        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count titles")?;
        let models = query
            .order_by_asc(titles::Column::Name)
            .order_by_asc(titles::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list titles")?;
        let results = hydrate(&self.db, models).await?;
        Ok(Page { count, results })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ApiError> {
        let model = titles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find title by id")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn create(&self, title: &NewTitle) -> Result<Title, ApiError> {
        let txn = self.db.begin().await.context("begin create title")?;
        let category_id = resolve_category(&txn, title.category.as_deref()).await?;
        let genre_ids = resolve_genres(&txn, &title.genres).await?;
        let model = titles::ActiveModel {
            name: Set(title.name.clone()),
            year: Set(title.year),
            description: Set(title.description.clone()),
            category_id: Set(category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert title")?;
        link_genres(&txn, model.id, &genre_ids).await?;
        txn.commit().await.context("commit create title")?;

        let created = hydrate(&self.db, vec![model]).await?.pop();
        Ok(created.context("created title not found")?)
    }

    async fn update(&self, id: i32, patch: &TitlePatch) -> Result<Option<Title>, ApiError> {
        let txn = self.db.begin().await.context("begin update title")?;
        let Some(model) = titles::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("find title for update")?
        else {
            return Ok(None);
        };

        let mut am = model.clone().into_active_model();
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(year) = patch.year {
            am.year = Set(year);
        }
        if let Some(description) = &patch.description {
            am.description = Set(Some(description.clone()));
        }
        if let Some(slug) = patch.category.as_deref() {
            am.category_id = Set(resolve_category(&txn, Some(slug)).await?);
        }
        let model = if am.is_changed() {
            am.update(&txn).await.context("update title")?
        } else {
            model
        };

        if let Some(slugs) = &patch.genres {
            let genre_ids = resolve_genres(&txn, slugs).await?;
            title_genres::Entity::delete_many()
                .filter(title_genres::Column::TitleId.eq(id))
                .exec(&txn)
                .await
                .context("unlink title genres")?;
            link_genres(&txn, id, &genre_ids).await?;
        }
        txn.commit().await.context("commit update title")?;

        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = titles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete title")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

fn review_from_model(model: reviews::Model, author: Option<users::Model>) -> Review {
    Review {
        id: model.id,
        title_id: model.title_id,
        author_id: model.author_id,
        author: author.map(|u| u.username).unwrap_or_default(),
        text: model.text,
        score: model.score,
        pub_date: model.pub_date,
    }
}

impl DbReviewRepository {
    async fn load(&self, review_id: i32) -> Result<Option<Review>, ApiError> {
        let row = reviews::Entity::find_by_id(review_id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("load review")?;
        Ok(row.map(|(review, author)| review_from_model(review, author)))
    }
}

impl ReviewRepository for DbReviewRepository {
    async fn title_exists(&self, title_id: i32) -> Result<bool, ApiError> {
        let title = titles::Entity::find_by_id(title_id)
            .one(&self.db)
            .await
            .context("check title exists")?;
        Ok(title.is_some())
    }

    async fn list(&self, title_id: i32, page: PageRequest) -> Result<Page<Review>, ApiError> {
        let base = reviews::Entity::find().filter(reviews::Column::TitleId.eq(title_id));
        let count = base
            .clone()
            .count(&self.db)
            .await
            .context("count reviews")?;
        let rows = base
            .find_also_related(users::Entity)
            .order_by_desc(reviews::Column::PubDate)
            .order_by_desc(reviews::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list reviews")?;
        Ok(Page {
            count,
            results: rows
                .into_iter()
                .map(|(review, author)| review_from_model(review, author))
                .collect(),
        })
    }

    async fn find(&self, title_id: i32, review_id: i32) -> Result<Option<Review>, ApiError> {
        let row = reviews::Entity::find_by_id(review_id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find review")?;
        Ok(row.map(|(review, author)| review_from_model(review, author)))
    }

    async fn create(
        &self,
        title_id: i32,
        author_id: i32,
        text: &str,
        score: i16,
    ) -> Result<Review, ApiError> {
        let txn = self.db.begin().await.context("begin create review")?;
        let title = titles::Entity::find_by_id(title_id)
            .one(&txn)
            .await
            .context("find title for review")?;
        if title.is_none() {
            return Err(ApiError::TitleNotFound);
        }
        let existing = reviews::Entity::find()
            .filter(reviews::Column::AuthorId.eq(author_id))
            .filter(reviews::Column::TitleId.eq(title_id))
            .one(&txn)
            .await
            .context("find existing review")?;
        if existing.is_some() {
            return Err(ApiError::ReviewAlreadyExists);
        }

        // The unique index still catches a concurrent insert that passed the
        // check above.
        let model = reviews::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text.to_owned()),
            score: Set(score),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_or_internal(e, ApiError::ReviewAlreadyExists, "insert review"))?;
        let author = users::Entity::find_by_id(author_id)
            .one(&txn)
            .await
            .context("load review author")?;
        txn.commit().await.context("commit create review")?;
        Ok(review_from_model(model, author))
    }

    async fn update(
        &self,
        review_id: i32,
        text: Option<&str>,
        score: Option<i16>,
    ) -> Result<Option<Review>, ApiError> {
        if text.is_some() || score.is_some() {
            let mut am = reviews::ActiveModel {
                id: Set(review_id),
                ..Default::default()
            };
            if let Some(text) = text {
                am.text = Set(text.to_owned());
            }
            if let Some(score) = score {
                am.score = Set(score);
            }
            match am.update(&self.db).await {
                Ok(_) => {}
                Err(DbErr::RecordNotUpdated) => return Ok(None),
                Err(e) => return Err(anyhow::Error::new(e).context("update review").into()),
            }
        }
        self.load(review_id).await
    }

    async fn delete(&self, review_id: i32) -> Result<bool, ApiError> {
        let result = reviews::Entity::delete_by_id(review_id)
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Comment repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCommentRepository {
    pub db: DatabaseConnection,
}

fn comment_from_model(model: comments::Model, author: Option<users::Model>) -> Comment {
    Comment {
        id: model.id,
        review_id: model.review_id,
        author_id: model.author_id,
        author: author.map(|u| u.username).unwrap_or_default(),
        text: model.text,
        pub_date: model.pub_date,
    }
}

async fn find_review_in_title<C: ConnectionTrait>(
    db: &C,
    title_id: i32,
    review_id: i32,
) -> Result<Option<reviews::Model>, ApiError> {
    Ok(reviews::Entity::find_by_id(review_id)
        .filter(reviews::Column::TitleId.eq(title_id))
        .one(db)
        .await
        .context("find review in title")?)
}

impl CommentRepository for DbCommentRepository {
    async fn review_exists(&self, title_id: i32, review_id: i32) -> Result<bool, ApiError> {
        Ok(find_review_in_title(&self.db, title_id, review_id)
            .await?
            .is_some())
    }

    async fn list(&self, review_id: i32, page: PageRequest) -> Result<Page<Comment>, ApiError> {
        let base = comments::Entity::find().filter(comments::Column::ReviewId.eq(review_id));
        let count = base
            .clone()
            .count(&self.db)
            .await
            .context("count comments")?;
        let rows = base
            .find_also_related(users::Entity)
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list comments")?;
        Ok(Page {
            count,
            results: rows
                .into_iter()
                .map(|(comment, author)| comment_from_model(comment, author))
                .collect(),
        })
    }

    async fn find(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<Option<Comment>, ApiError> {
        if !self.review_exists(title_id, review_id).await? {
            return Ok(None);
        }
        let row = comments::Entity::find_by_id(comment_id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find comment")?;
        Ok(row.map(|(comment, author)| comment_from_model(comment, author)))
    }

    async fn create(
        &self,
        title_id: i32,
        review_id: i32,
        author_id: i32,
        text: &str,
    ) -> Result<Comment, ApiError> {
        let txn = self.db.begin().await.context("begin create comment")?;
        if find_review_in_title(&txn, title_id, review_id)
            .await?
            .is_none()
        {
            return Err(ApiError::ReviewNotFound);
        }
        let model = comments::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text.to_owned()),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert comment")?;
        let author = users::Entity::find_by_id(author_id)
            .one(&txn)
            .await
            .context("load comment author")?;
        txn.commit().await.context("commit create comment")?;
        Ok(comment_from_model(model, author))
    }

    async fn update(&self, comment_id: i32, text: &str) -> Result<Option<Comment>, ApiError> {
        let am = comments::ActiveModel {
            id: Set(comment_id),
            text: Set(text.to_owned()),
            ..Default::default()
        };
        let model = match am.update(&self.db).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Ok(None),
            Err(e) => return Err(anyhow::Error::new(e).context("update comment").into()),
        };
        let author = users::Entity::find_by_id(model.author_id)
            .one(&self.db)
            .await
            .context("load comment author")?;
        Ok(Some(comment_from_model(model, author)))
    }

    async fn delete(&self, comment_id: i32) -> Result<bool, ApiError> {
        let result = comments::Entity::delete_by_id(comment_id)
            .exec(&self.db)
            .await
            .context("delete comment")?;
        Ok(result.rows_affected > 0)
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

fn user_from_model(model: users::Model) -> User {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(UserRole::from_u8)
        .unwrap_or_default();
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        bio: model.bio,
        role,
        is_superuser: model.is_superuser,
        last_login: model.last_login,
        date_joined: model.date_joined,
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Page<User>, ApiError> {
        let mut query = users::Entity::find();
        if let Some(search) = search {
            query = query.filter(contains_ci(users::Column::Username, search));
        }
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count users")?;
        let models = query
            .order_by_asc(users::Column::Username)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(Page {
            count,
            results: models.into_iter().map(user_from_model).collect(),
        })
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let model = users::ActiveModel {
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            bio: Set(user.bio.clone()),
            role: Set(i16::from(user.role.as_u8())),
            is_superuser: Set(false),
            last_login: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, ApiError::UserAlreadyExists, "create user"))?;
        Ok(user_from_model(model))
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> Result<Option<User>, ApiError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(None);
        };

        let mut am = model.clone().into_active_model();
        if let Some(username) = &patch.username {
            am.username = Set(username.clone());
        }
        if let Some(email) = &patch.email {
            am.email = Set(email.clone());
        }
        if let Some(first_name) = &patch.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            am.last_name = Set(last_name.clone());
        }
        if let Some(bio) = &patch.bio {
            am.bio = Set(bio.clone());
        }
        if let Some(role) = patch.role {
            am.role = Set(i16::from(role.as_u8()));
        }
        if !am.is_changed() {
            return Ok(Some(user_from_model(model)));
        }
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::UserAlreadyExists, "update user"))?;
        Ok(Some(user_from_model(model)))
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, ApiError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }

    async fn touch_last_login(&self, id: i32, at: DateTime<Utc>) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            last_login: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch last login")?;
        Ok(())
    }
}
