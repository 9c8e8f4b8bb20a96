use yamdb_domain::user::Actor;

use crate::domain::repository::UserRepository;
use crate::error::ApiError;

/// Resolve the bearer of a valid token to an [`Actor`] using the stored role
/// and superuser flag, so demotions apply before the token expires.
pub struct ResolveActorUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResolveActorUseCase<U> {
    pub async fn execute(&self, user_id: i32) -> Result<Actor, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.actor())
            .ok_or(ApiError::Unauthorized)
    }
}
