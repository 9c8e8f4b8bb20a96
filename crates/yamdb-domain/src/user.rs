//! User domain types.

use serde::{Deserialize, Serialize};

/// User permission level.
///
/// JSON format: lowercase string. Storage and JWT wire format: `u8`
/// (0 = User, 1 = Moderator, 2 = Admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User = 0,
    Moderator = 1,
    Admin = 2,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::User),
            1 => Some(Self::Moderator),
            2 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

/// The authenticated principal of a request, resolved from storage.
///
/// Superuser standing is kept apart from the role: a superuser with role
/// `user` is still an admin for every access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: UserRole,
    pub is_superuser: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == UserRole::Moderator
    }
}
