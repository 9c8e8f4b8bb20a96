use yamdb_auth_types::confirmation::ConfirmationCodes;

use crate::domain::repository::{Mailer, UserRepository};
use crate::domain::types::{NewUser, OutgoingMail, User};
use crate::domain::validation::{FieldErrors, validate_email, validate_username};
use crate::error::ApiError;
use crate::usecase::unix_now;

const MAIL_SUBJECT: &str = "YaMDb registration";

pub struct SignupInput {
    pub username: String,
    pub email: String,
}

/// Register (or re-register) a `(username, email)` pair and mail a fresh
/// confirmation code.
///
/// Signing up again with exactly the same pair is idempotent and re-sends a
/// code; a pair that collides with another account on either field fails.
pub struct SignupUseCase<U: UserRepository, M: Mailer> {
    pub users: U,
    pub mailer: M,
    pub codes: ConfirmationCodes,
}

impl<U: UserRepository, M: Mailer> SignupUseCase<U, M> {
    pub async fn execute(&self, input: SignupInput) -> Result<User, ApiError> {
        let mut errors = FieldErrors::default();
        validate_username(&input.username, &mut errors);
        validate_email(&input.email, &mut errors);
        errors.into_result()?;

        let user = match self.find_pair(&input).await? {
            Some(user) => user,
            None => self.create(&input).await?,
        };

        let code = self.codes.make_code(&user.fingerprint(), unix_now());
        self.mailer.send(OutgoingMail {
            subject: MAIL_SUBJECT.to_owned(),
            body: format!("Your confirmation code: {code}"),
            recipient: user.email.clone(),
        });
        tracing::info!(user_id = user.id, "confirmation code issued");
        Ok(user)
    }

    /// The user owning exactly this pair, `None` if neither field is taken,
    /// `UserAlreadyExists` if either belongs to someone else.
    async fn find_pair(&self, input: &SignupInput) -> Result<Option<User>, ApiError> {
        match self.users.find_by_username(&input.username).await? {
            Some(user) if user.email == input.email => Ok(Some(user)),
            Some(_) => Err(ApiError::UserAlreadyExists),
            None => match self.users.find_by_email(&input.email).await? {
                Some(_) => Err(ApiError::UserAlreadyExists),
                None => Ok(None),
            },
        }
    }

    async fn create(&self, input: &SignupInput) -> Result<User, ApiError> {
        let new_user = NewUser {
            username: input.username.clone(),
            email: input.email.clone(),
            ..NewUser::default()
        };
        match self.users.create(&new_user).await {
            Ok(user) => Ok(user),
            // A concurrent sign-up with the same pair won the insert.
            Err(ApiError::UserAlreadyExists) => self
                .find_pair(input)
                .await?
                .ok_or(ApiError::UserAlreadyExists),
            Err(e) => Err(e),
        }
    }
}
