use yamdb_api::domain::types::{NewUser, UserPatch};
use yamdb_api::error::ApiError;
use yamdb_api::usecase::user::{
    CreateUserUseCase, DeleteUserUseCase, GetMeUseCase, GetUserUseCase, ListUsersUseCase,
    UpdateMeUseCase, UpdateUserUseCase,
};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::user::{Actor, UserRole};

use crate::helpers::{Store, has_field_error};

#[tokio::test]
async fn should_let_admin_create_user_with_role() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let user = CreateUserUseCase {
        users: store.user_repo(),
    }
    .execute(
        Some(&admin.actor()),
        NewUser {
            username: "mod".to_owned(),
            email: "mod@example.com".to_owned(),
            role: UserRole::Moderator,
            ..NewUser::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(user.role, UserRole::Moderator);
}

#[tokio::test]
async fn should_forbid_moderator_from_user_admin() {
    let store = Store::default();
    let moderator = store.add_user("mod", UserRole::Moderator);
    store.add_user("alice", UserRole::User);

    let result = ListUsersUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&moderator.actor()), None, PageRequest::default())
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    let result = GetUserUseCase {
        users: store.user_repo(),
    }
    .execute(None, "alice")
    .await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_treat_superuser_as_admin() {
    let store = Store::default();
    let boss = store.add_user("boss", UserRole::User);
    let actor = Actor {
        is_superuser: true,
        ..boss.actor()
    };

    let page = ListUsersUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&actor), None, PageRequest::default())
    .await
    .unwrap();

    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn should_search_users_by_username() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_user("alice", UserRole::User);
    store.add_user("alicia", UserRole::User);
    store.add_user("bob", UserRole::User);

    let page = ListUsersUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&admin.actor()), Some("ALI"), PageRequest::default())
    .await
    .unwrap();

    let names: Vec<_> = page.results.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["alice", "alicia"]);
}

#[tokio::test]
async fn should_let_admin_change_role_by_username() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_user("alice", UserRole::User);

    let user = UpdateUserUseCase {
        users: store.user_repo(),
    }
    .execute(
        Some(&admin.actor()),
        "alice",
        UserPatch {
            role: Some(UserRole::Moderator),
            ..UserPatch::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(user.role, UserRole::Moderator);
}

#[tokio::test]
async fn should_reject_username_collision_on_update() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    store.add_user("alice", UserRole::User);

    let result = UpdateUserUseCase {
        users: store.user_repo(),
    }
    .execute(
        Some(&admin.actor()),
        "alice",
        UserPatch {
            username: Some("root".to_owned()),
            ..UserPatch::default()
        },
    )
    .await;

    assert!(matches!(result, Err(ApiError::UserAlreadyExists)));
}

#[tokio::test]
async fn should_delete_user_with_their_reviews_and_comments() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);
    let alice = store.add_user("alice", UserRole::User);
    let title = store.add_title("Dune", 1965);
    let review = store.add_review(title.id, alice.id, 4);
    store.add_comment(review.id, admin.id);

    DeleteUserUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&admin.actor()), "alice")
    .await
    .unwrap();

    let tables = store.lock();
    assert_eq!(tables.users.len(), 1);
    assert!(tables.reviews.is_empty());
    assert!(tables.comments.is_empty());
}

#[tokio::test]
async fn should_return_not_found_for_unknown_username() {
    let store = Store::default();
    let admin = store.add_user("root", UserRole::Admin);

    let result = DeleteUserUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&admin.actor()), "ghost")
    .await;

    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

// ── /users/me/ ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_own_profile() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);

    let me = GetMeUseCase {
        users: store.user_repo(),
    }
    .execute(Some(&alice.actor()))
    .await
    .unwrap();

    assert_eq!(me, alice);

    let result = GetMeUseCase {
        users: store.user_repo(),
    }
    .execute(None)
    .await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_ignore_role_in_own_profile_update() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);

    let me = UpdateMeUseCase {
        users: store.user_repo(),
    }
    .execute(
        Some(&alice.actor()),
        UserPatch {
            bio: Some("Reader".to_owned()),
            role: Some(UserRole::Admin),
            ..UserPatch::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(me.bio, "Reader");
    assert_eq!(me.role, UserRole::User);
}

#[tokio::test]
async fn should_validate_own_profile_update() {
    let store = Store::default();
    let alice = store.add_user("alice", UserRole::User);

    let err = UpdateMeUseCase {
        users: store.user_repo(),
    }
    .execute(
        Some(&alice.actor()),
        UserPatch {
            username: Some("me".to_owned()),
            ..UserPatch::default()
        },
    )
    .await
    .unwrap_err();

    assert!(has_field_error(&err, "username"));
}
