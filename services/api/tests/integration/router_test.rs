use std::collections::BTreeMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use tower::ServiceExt;

use yamdb_api::infra::mail::LettreMailer;
use yamdb_api::router::build_router;
use yamdb_api::state::AppState;
use yamdb_api_schema::{genres, title_genres, titles, users};
use yamdb_auth_types::confirmation::{ConfirmationCodes, DEFAULT_CODE_TTL_SECS};
use yamdb_domain::user::UserRole;
use yamdb_testing::auth::{MockAuth, TEST_JWT_SECRET};

use crate::helpers::TEST_SECRET_KEY;

fn user_row(id: i32, username: &str, role: UserRole) -> users::Model {
    users::Model {
        id,
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        bio: String::new(),
        role: i16::from(role.as_u8()),
        is_superuser: false,
        last_login: None,
        date_joined: Utc::now(),
    }
}

fn router(db: DatabaseConnection) -> Router {
    build_router(AppState {
        db,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        access_token_ttl_secs: 3600,
        codes: ConfirmationCodes::new(TEST_SECRET_KEY, DEFAULT_CODE_TTL_SECS).unwrap(),
        mailer: LettreMailer::new("noreply@yamdb.local", None, 25).unwrap(),
    })
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// A database whose only answer is the given user row, as looked up by the
/// bearer-token extractor.
fn db_with_user(row: users::Model) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .into_connection()
}

fn json_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn should_answer_health_checks_with_request_id() {
    let resp = router(empty_db())
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_anonymous_category_create_with_401() {
    let body = r#"{"name":"Books","slug":"books"}"#;
    let resp = router(empty_db())
        .oneshot(
            json_request("POST", "/api/v1/categories/")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_plain_user_category_create_with_403() {
    let auth = MockAuth::new(7, UserRole::User.as_u8());
    let body = r#"{"name":"Books","slug":"books"}"#;
    let mut request = json_request("POST", "/api/v1/categories/")
        .body(Body::from(body))
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db_with_user(user_row(7, "alice", UserRole::User)))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_use_stored_role_over_token_claim() {
    // The token claims admin, but the stored account was demoted.
    let auth = MockAuth::new(7, UserRole::Admin.as_u8());
    let mut request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/genres/drama/")
        .body(Body::empty())
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db_with_user(user_row(7, "alice", UserRole::User)))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_invalid_token_even_on_public_endpoint() {
    let resp = router(empty_db())
        .oneshot(
            Request::builder()
                .uri("/api/v1/titles/")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_return_own_profile_from_me_endpoint() {
    let auth = MockAuth::new(3, UserRole::Moderator.as_u8());
    let row = user_row(3, "carol", UserRole::Moderator);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row.clone()], vec![row]])
        .into_connection();
    let mut request = Request::builder()
        .uri("/api/v1/users/me/")
        .body(Body::empty())
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["username"], "carol");
    assert_eq!(json["role"], "moderator");
    assert!(json.get("id").is_none());
}

#[tokio::test]
async fn should_reject_reserved_username_on_signup() {
    let body = r#"{"username":"me","email":"me@example.com"}"#;
    let resp = router(empty_db())
        .oneshot(
            json_request("POST", "/api/v1/auth/signup/")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "VALIDATION");
    assert!(json["fields"]["username"].is_array());
}

#[tokio::test]
async fn should_require_authentication_for_user_admin() {
    let resp = router(empty_db())
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_ignore_role_in_own_profile_update() {
    let auth = MockAuth::new(7, UserRole::User.as_u8());
    let row = user_row(7, "alice", UserRole::User);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row.clone()], vec![row]])
        .into_connection();
    let mut request = json_request("PATCH", "/api/v1/users/me/")
        .body(Body::from(r#"{"role":"superadmin"}"#))
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["role"], "user");
}

#[tokio::test]
async fn should_report_out_of_range_score_as_validation_error() {
    let auth = MockAuth::new(7, UserRole::User.as_u8());
    let mut request = json_request("POST", "/api/v1/titles/1/reviews/")
        .body(Body::from(r#"{"text":"Loud","score":40000}"#))
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db_with_user(user_row(7, "alice", UserRole::User)))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "VALIDATION");
    assert!(json["fields"]["score"].is_array());
}

#[tokio::test]
async fn should_report_malformed_json_as_validation_error() {
    let resp = router(empty_db())
        .oneshot(
            json_request("POST", "/api/v1/auth/signup/")
                .body(Body::from(r#"{"username": "#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "VALIDATION");
    assert!(json["fields"]["non_field_errors"].is_array());
}

fn title_row(id: i32) -> titles::Model {
    titles::Model {
        id,
        name: "Dune".to_owned(),
        year: 1965,
        description: None,
        category_id: None,
    }
}

/// Answers for an anonymous title lookup: the title row, its genre links
/// and the `AVG(score)` aggregate rows.
fn db_with_title(
    row: titles::Model,
    ratings: Vec<BTreeMap<&'static str, Value>>,
) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .append_query_results([Vec::<title_genres::Model>::new()])
        .append_query_results([ratings])
        .into_connection()
}

#[tokio::test]
async fn should_return_null_rating_for_title_without_reviews() {
    let resp = router(db_with_title(title_row(1), Vec::new()))
        .oneshot(
            Request::builder()
                .uri("/api/v1/titles/1/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["name"], "Dune");
    assert!(json["rating"].is_null());
}

#[tokio::test]
async fn should_return_aggregated_rating_for_reviewed_title() {
    let aggregate = BTreeMap::from([
        ("title_id", Value::from(1i32)),
        ("rating", Value::from(7.5f64)),
    ]);
    let resp = router(db_with_title(title_row(1), vec![aggregate]))
        .oneshot(
            Request::builder()
                .uri("/api/v1/titles/1/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["rating"], 7.5);
}

#[tokio::test]
async fn should_list_genres_with_count() {
    let count = BTreeMap::from([("num_items", Value::from(2i64))]);
    let rows = vec![
        genres::Model {
            id: 2,
            name: "Drama".to_owned(),
            slug: "drama".to_owned(),
        },
        genres::Model {
            id: 1,
            name: "Sci-Fi".to_owned(),
            slug: "sci-fi".to_owned(),
        },
    ];
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([rows])
        .into_connection();

    let resp = router(db)
        .oneshot(
            Request::builder()
                .uri("/api/v1/genres/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["results"][0]["slug"], "drama");
    assert_eq!(json["results"][1]["name"], "Sci-Fi");
}

#[tokio::test]
async fn should_answer_not_found_when_deleting_unknown_genre() {
    let auth = MockAuth::new(1, UserRole::Admin.as_u8());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(1, "boss", UserRole::Admin)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let mut request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/genres/western/")
        .body(Body::empty())
        .unwrap();
    request.headers_mut().extend(auth.headers());

    let resp = router(db).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["kind"], "GENRE_NOT_FOUND");
}
