//! Mock auth helpers for tests.
//!
//! `MockAuth` signs a real access token with a test secret so requests carry the
//! same `Authorization: Bearer` header a logged-in client would send.

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use yamdb_auth_types::token::encode_access_token;

/// Secret shared by test routers and [`MockAuth`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: i32,
    pub user_role: u8,
}

impl MockAuth {
    pub fn new(user_id: i32, user_role: u8) -> Self {
        Self { user_id, user_role }
    }

    /// A token valid for one hour, signed with [`TEST_JWT_SECRET`].
    pub fn token(&self) -> String {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            + 3600;
        encode_access_token(self.user_id, self.user_role, exp, TEST_JWT_SECRET)
            .unwrap_or_else(|e| panic!("failed to sign test token: {e}"))
    }

    /// Return headers as a logged-in client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .unwrap_or_else(|e| panic!("invalid authorization header: {e}"));
        map.insert(AUTHORIZATION, value);
        map
    }
}
