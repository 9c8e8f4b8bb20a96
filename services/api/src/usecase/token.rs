use anyhow::Context as _;
use chrono::Utc;

use yamdb_auth_types::confirmation::ConfirmationCodes;
use yamdb_auth_types::token::encode_access_token;

use crate::domain::repository::UserRepository;
use crate::domain::validation::FieldErrors;
use crate::error::ApiError;
use crate::usecase::unix_now;

pub struct IssueTokenInput {
    pub username: String,
    pub confirmation_code: String,
}

/// Exchange a confirmation code for a bearer access token.
pub struct IssueTokenUseCase<U: UserRepository> {
    pub users: U,
    pub codes: ConfirmationCodes,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
}

impl<U: UserRepository> IssueTokenUseCase<U> {
    pub async fn execute(&self, input: IssueTokenInput) -> Result<String, ApiError> {
        let mut errors = FieldErrors::default();
        if input.username.is_empty() {
            errors.add("username", "this field may not be blank");
        }
        if input.confirmation_code.is_empty() {
            errors.add("confirmation_code", "this field may not be blank");
        }
        errors.into_result()?;

        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let now = unix_now();
        if !self
            .codes
            .check_code(&user.fingerprint(), &input.confirmation_code, now)
        {
            return Err(ApiError::InvalidConfirmationCode);
        }

        // Moves the fingerprint forward, so the code just used stops working.
        self.users.touch_last_login(user.id, Utc::now()).await?;

        let token = encode_access_token(
            user.id,
            user.role.as_u8(),
            now + self.access_token_ttl_secs,
            &self.jwt_secret,
        )
        .context("sign access token")?;
        tracing::info!(user_id = user.id, "access token issued");
        Ok(token)
    }
}
