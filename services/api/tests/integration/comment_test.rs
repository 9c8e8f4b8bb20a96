use yamdb_api::error::ApiError;
use yamdb_api::usecase::comment::{
    CreateCommentUseCase, DeleteCommentUseCase, GetCommentUseCase, ListCommentsUseCase,
    UpdateCommentUseCase,
};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::user::UserRole;

use crate::helpers::{Store, has_field_error};

#[tokio::test]
async fn should_create_comment_bound_to_actor_and_review() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let bob = store.add_user("bob", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);

    let comment = CreateCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(Some(&bob.actor()), title.id, review.id, "Agreed".to_owned())
    .await
    .unwrap();

    assert_eq!(comment.author, "bob");
    assert_eq!(comment.review_id, review.id);
    assert_eq!(comment.text, "Agreed");
}

#[tokio::test]
async fn should_reject_blank_comment_text() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);

    let err = CreateCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(Some(&alice.actor()), title.id, review.id, "   ".to_owned())
    .await
    .unwrap_err();

    assert!(has_field_error(&err, "text"));
}

#[tokio::test]
async fn should_reject_comment_on_review_of_another_title() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let dune = store.add_title("Dune", 1965);
    let solaris = store.add_title("Solaris", 1961);
    let review = store.add_review(dune.id, alice.id, 7);

    let result = CreateCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(Some(&alice.actor()), solaris.id, review.id, "x".to_owned())
    .await;

    assert!(
        matches!(result, Err(ApiError::ReviewNotFound)),
        "expected ReviewNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_only_comments_of_given_review() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let bob = store.add_user("bob", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let first = store.add_review(title.id, alice.id, 7);
    let second = store.add_review(title.id, bob.id, 4);
    store.add_comment(first.id, bob.id);
    store.add_comment(first.id, alice.id);
    store.add_comment(second.id, alice.id);

    let page = ListCommentsUseCase {
        repo: store.comment_repo(),
    }
    .execute(None, title.id, first.id, PageRequest::default())
    .await
    .unwrap();

    assert_eq!(page.count, 2);
    assert!(page.results.iter().all(|c| c.review_id == first.id));
}

#[tokio::test]
async fn should_tell_missing_comment_from_missing_review() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);
    let uc = GetCommentUseCase {
        repo: store.comment_repo(),
    };

    let result = uc.execute(None, title.id, review.id, 999).await;
    assert!(matches!(result, Err(ApiError::CommentNotFound)));

    let result = uc.execute(None, title.id, 999, 1).await;
    assert!(matches!(result, Err(ApiError::ReviewNotFound)));
}

#[tokio::test]
async fn should_let_only_author_or_staff_edit_comment() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let bob = store.add_user("bob", UserRole::User);
    let moderator = store.add_user("mod", UserRole::Moderator);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);
    let comment = store.add_comment(review.id, bob.id);
    let uc = UpdateCommentUseCase {
        repo: store.comment_repo(),
    };

    let result = uc
        .execute(
            Some(&alice.actor()),
            title.id,
            review.id,
            comment.id,
            Some("edited by alice".to_owned()),
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    let updated = uc
        .execute(
            Some(&moderator.actor()),
            title.id,
            review.id,
            comment.id,
            Some("edited".to_owned()),
        )
        .await
        .unwrap();
    assert_eq!(updated.text, "edited");
    assert_eq!(updated.author, "bob");
}

#[tokio::test]
async fn should_keep_comment_when_update_has_no_text() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);
    let comment = store.add_comment(review.id, alice.id);

    let unchanged = UpdateCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(Some(&alice.actor()), title.id, review.id, comment.id, None)
    .await
    .unwrap();

    assert_eq!(unchanged, comment);
}

#[tokio::test]
async fn should_require_authentication_before_lookup_on_delete() {
    let store = Store::default();

    let result = DeleteCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(None, 1, 2, 3)
    .await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_let_author_delete_own_comment() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 7);
    let comment = store.add_comment(review.id, alice.id);

    DeleteCommentUseCase {
        repo: store.comment_repo(),
    }
    .execute(Some(&alice.actor()), title.id, review.id, comment.id)
    .await
    .unwrap();

    assert!(store.lock().comments.is_empty());
}
