use yamdb_api::domain::types::TermKind;
use yamdb_api::error::ApiError;
use yamdb_api::usecase::term::{
    CreateTermInput, CreateTermUseCase, DeleteTermUseCase, ListTermsUseCase,
};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::user::UserRole;

use crate::helpers::{Store, has_field_error};

fn input(name: &str, slug: &str) -> CreateTermInput {
    CreateTermInput {
        name: name.to_owned(),
        slug: slug.to_owned(),
    }
}

#[tokio::test]
async fn should_create_category_as_admin() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let term = CreateTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&admin.actor()), input("Books", "books"))
    .await
    .unwrap();

    assert_eq!(term.slug, "books");
    assert_eq!(store.lock().categories.len(), 1);
    assert!(store.lock().genres.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_slug_within_vocabulary() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_term(TermKind::Genre, "Drama", "drama");

    let result = CreateTermUseCase {
        repo: store.term_repo(TermKind::Genre),
    }
    .execute(Some(&admin.actor()), input("Drama 2", "drama"))
    .await;
    assert!(matches!(result, Err(ApiError::SlugAlreadyExists)));

    // Categories and genres have separate slug spaces.
    CreateTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&admin.actor()), input("Drama", "drama"))
    .await
    .unwrap();
}

#[tokio::test]
async fn should_reject_invalid_slug() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let err = CreateTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&admin.actor()), input("Books", "no spaces!"))
    .await
    .unwrap_err();

    assert!(has_field_error(&err, "slug"));
}

#[tokio::test]
async fn should_forbid_non_admin_term_writes() {
    let store = Store::default();
    let user = store.add_user("alice", UserRole::User);
    store.add_term(TermKind::Category, "Books", "books");

    let result = CreateTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&user.actor()), input("Films", "films"))
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    let result = DeleteTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(None, "books")
    .await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_search_terms_by_name() {
    let store = Store::default();
    store.add_term(TermKind::Genre, "Drama", "drama");
    store.add_term(TermKind::Genre, "Melodrama", "melodrama");
    store.add_term(TermKind::Genre, "Comedy", "comedy");

    let page = ListTermsUseCase {
        repo: store.term_repo(TermKind::Genre),
    }
    .execute(None, Some("DRAMA"), PageRequest::default())
    .await
    .unwrap();

    assert_eq!(page.count, 2);
    let names: Vec<_> = page.results.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Drama", "Melodrama"]);
}

#[tokio::test]
async fn should_keep_titles_when_category_is_deleted() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    let books = store.add_term(TermKind::Category, "Books", "books");
    let title = store.add_title("Dune", 1965);
    store
        .lock()
        .titles
        .iter_mut()
        .for_each(|t| t.category = Some(books.clone()));

    DeleteTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&admin.actor()), "books")
    .await
    .unwrap();

    let tables = store.lock();
    assert!(tables.categories.is_empty());
    assert_eq!(tables.titles[0].id, title.id);
    assert_eq!(tables.titles[0].category, None);
}

#[tokio::test]
async fn should_return_kind_specific_not_found() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let result = DeleteTermUseCase {
        repo: store.term_repo(TermKind::Category),
    }
    .execute(Some(&admin.actor()), "missing")
    .await;
    assert!(matches!(result, Err(ApiError::CategoryNotFound)));

    let result = DeleteTermUseCase {
        repo: store.term_repo(TermKind::Genre),
    }
    .execute(Some(&admin.actor()), "missing")
    .await;
    assert!(matches!(result, Err(ApiError::GenreNotFound)));
}
