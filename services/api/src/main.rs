use sea_orm::Database;
use tracing::info;

use yamdb_api::config::ApiConfig;
use yamdb_api::infra::mail::LettreMailer;
use yamdb_api::router::build_router;
use yamdb_api::state::AppState;
use yamdb_auth_types::confirmation::ConfirmationCodes;
use yamdb_core::config::Config;
use yamdb_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env().expect("failed to load configuration");
    info!(?config, "configuration loaded");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = LettreMailer::new(
        &config.mail_from,
        config.smtp_host.as_deref(),
        config.smtp_port,
    )
    .expect("invalid mail configuration");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret.clone(),
        access_token_ttl_secs: config.access_token_ttl_secs,
        codes: ConfirmationCodes::new(&config.secret_key, config.confirmation_code_ttl_secs)
            .expect("invalid SECRET_KEY"),
        mailer,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
