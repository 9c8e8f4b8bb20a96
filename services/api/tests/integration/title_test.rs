use yamdb_api::domain::types::{TermKind, TitleFilter, TitlePatch};
use yamdb_api::error::ApiError;
use yamdb_api::usecase::title::{
    CreateTitleInput, CreateTitleUseCase, DeleteTitleUseCase, ListTitlesUseCase,
    UpdateTitleUseCase,
};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::user::UserRole;

use crate::helpers::{Store, has_field_error};

fn dune(category: Option<&str>, genres: &[&str]) -> CreateTitleInput {
    CreateTitleInput {
        name: "Dune".to_owned(),
        year: Some(1965),
        description: Some("Desert planet".to_owned()),
        category: category.map(str::to_owned),
        genres: genres.iter().map(|g| (*g).to_owned()).collect(),
    }
}

async fn names(store: &Store, filter: TitleFilter) -> Vec<String> {
    ListTitlesUseCase {
        repo: store.title_repo(),
    }
    .execute(None, filter, PageRequest::default())
    .await
    .unwrap()
    .results
    .into_iter()
    .map(|t| t.name)
    .collect()
}

#[tokio::test]
async fn should_create_title_with_category_and_genres() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_term(TermKind::Category, "Books", "books");
    store.add_term(TermKind::Genre, "Sci-Fi", "sci-fi");
    store.add_term(TermKind::Genre, "Drama", "drama");

    let title = CreateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(Some(&admin.actor()), dune(Some("books"), &["sci-fi", "drama"]))
    .await
    .unwrap();

    assert_eq!(title.category.unwrap().slug, "books");
    let slugs: Vec<_> = title.genres.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["sci-fi", "drama"]);
    assert_eq!(title.rating, None);
}

#[tokio::test]
async fn should_reject_unknown_category_slug() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let err = CreateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(Some(&admin.actor()), dune(Some("nope"), &[]))
    .await
    .unwrap_err();

    assert!(has_field_error(&err, "category"));
    assert!(store.lock().titles.is_empty());
}

#[tokio::test]
async fn should_reject_future_year_and_missing_fields() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let err = CreateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(
        Some(&admin.actor()),
        CreateTitleInput {
            name: String::new(),
            year: Some(9999),
            description: None,
            category: None,
            genres: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(has_field_error(&err, "name"));
    assert!(has_field_error(&err, "year"));

    let err = CreateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(
        Some(&admin.actor()),
        CreateTitleInput {
            year: None,
            ..dune(None, &[])
        },
    )
    .await
    .unwrap_err();
    assert!(has_field_error(&err, "year"));
}

#[tokio::test]
async fn should_restrict_title_writes_to_admins() {
    let store = Store::default();
    let moderator = store.add_user("mod", UserRole::Moderator);
    let uc = CreateTitleUseCase {
        repo: store.title_repo(),
    };

    let result = uc.execute(Some(&moderator.actor()), dune(None, &[])).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    let result = uc.execute(None, dune(None, &[])).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_filter_titles_by_name_year_category_and_genre() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_term(TermKind::Category, "Books", "books");
    store.add_term(TermKind::Category, "Films", "films");
    store.add_term(TermKind::Genre, "Sci-Fi", "sci-fi");
    let create = CreateTitleUseCase {
        repo: store.title_repo(),
    };
    create
        .execute(Some(&admin.actor()), dune(Some("books"), &["sci-fi"]))
        .await
        .unwrap();
    create
        .execute(
            Some(&admin.actor()),
            CreateTitleInput {
                name: "Dune Messiah".to_owned(),
                year: Some(1969),
                ..dune(Some("books"), &[])
            },
        )
        .await
        .unwrap();
    create
        .execute(
            Some(&admin.actor()),
            CreateTitleInput {
                name: "Solaris".to_owned(),
                year: Some(1972),
                ..dune(Some("films"), &["sci-fi"])
            },
        )
        .await
        .unwrap();
    let by_name = names(&store, TitleFilter {
        name: Some("dUNE".to_owned()),
        ..TitleFilter::default()
    })
    .await;
    assert_eq!(by_name, ["Dune", "Dune Messiah"]);

    let by_year = names(&store, TitleFilter {
        year: Some(1972),
        ..TitleFilter::default()
    })
    .await;
    assert_eq!(by_year, ["Solaris"]);

    let by_genre_and_category = names(&store, TitleFilter {
        category: Some("books".to_owned()),
        genre: Some("sci-fi".to_owned()),
        ..TitleFilter::default()
    })
    .await;
    assert_eq!(by_genre_and_category, ["Dune"]);
}

#[tokio::test]
async fn should_paginate_titles_with_total_count() {
    let store = Store::default();
    for (i, name) in ["A", "B", "C", "D", "E"].into_iter().enumerate() {
        store.add_title(name, 2000 + i as i32);
    }

    let page = ListTitlesUseCase {
        repo: store.title_repo(),
    }
    .execute(
        None,
        TitleFilter::default(),
        PageRequest {
            per_page: 2,
            page: 2,
        },
    )
    .await
    .unwrap();

    assert_eq!(page.count, 5);
    let names: Vec<_> = page.results.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["C", "D"]);
}

#[tokio::test]
async fn should_replace_genres_on_update() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_term(TermKind::Genre, "Sci-Fi", "sci-fi");
    store.add_term(TermKind::Genre, "Drama", "drama");
    let title = CreateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(Some(&admin.actor()), dune(None, &["sci-fi"]))
    .await
    .unwrap();

    let updated = UpdateTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(
        Some(&admin.actor()),
        title.id,
        TitlePatch {
            name: Some("Dune (1965)".to_owned()),
            genres: Some(vec!["drama".to_owned()]),
            ..TitlePatch::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Dune (1965)");
    assert_eq!(updated.year, 1965);
    let slugs: Vec<_> = updated.genres.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["drama"]);
}

#[tokio::test]
async fn should_cascade_title_delete_to_reviews_and_comments() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, admin.id, 9);
    store.add_comment(review.id, admin.id);

    DeleteTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(Some(&admin.actor()), title.id)
    .await
    .unwrap();

    let tables = store.lock();
    assert!(tables.titles.is_empty());
    assert!(tables.reviews.is_empty());
    assert!(tables.comments.is_empty());
}

#[tokio::test]
async fn should_return_not_found_when_deleting_missing_title() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let result = DeleteTitleUseCase {
        repo: store.title_repo(),
    }
    .execute(Some(&admin.actor()), 404)
    .await;

    assert!(matches!(result, Err(ApiError::TitleNotFound)));
}
