use serde::Deserialize;

use yamdb_auth_types::confirmation::DEFAULT_CODE_TTL_SECS;
use yamdb_core::config::Config;

/// API service configuration loaded from environment variables.
///
/// Field names map to upper-case variables (`database_url` → `DATABASE_URL`).
#[derive(Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3000). Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// HMAC key for confirmation codes.
    pub secret_key: String,
    /// HMAC secret for signing access tokens. Independent of `secret_key`.
    pub jwt_secret: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_confirmation_code_ttl_secs")]
    pub confirmation_code_ttl_secs: u64,
    /// Sender address of outgoing mail.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    /// SMTP relay. When unset, mail is written to the log.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_api_port() -> u16 {
    3000
}

fn default_access_token_ttl_secs() -> u64 {
    86_400
}

fn default_confirmation_code_ttl_secs() -> u64 {
    DEFAULT_CODE_TTL_SECS
}

fn default_mail_from() -> String {
    "noreply@yamdb.local".to_owned()
}

fn default_smtp_port() -> u16 {
    25
}

impl Config for ApiConfig {}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_port", &self.api_port)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("confirmation_code_ttl_secs", &self.confirmation_code_ttl_secs)
            .field("mail_from", &self.mail_from)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish_non_exhaustive()
    }
}
