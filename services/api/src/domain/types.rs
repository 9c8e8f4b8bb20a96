use chrono::{DateTime, Utc};

use yamdb_auth_types::confirmation::UserFingerprint;
use yamdb_domain::access::Resource;
use yamdb_domain::user::{Actor, UserRole};

/// Which slug-addressed catalog vocabulary a [`Term`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Genre,
}

impl TermKind {
    pub fn resource(self) -> Resource {
        match self {
            Self::Category => Resource::Category,
            Self::Genre => Resource::Genre,
        }
    }
}

/// A category or a genre. Both share the `{name, slug}` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// A reviewable work, hydrated with its category, genres and aggregated
/// rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<Term>,
    pub genres: Vec<Term>,
    /// Mean review score; `None` when the title has no reviews.
    pub rating: Option<f64>,
}

/// List filters for titles. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    pub year: Option<i32>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
}

/// A title to insert. Category and genres are given by slug.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Vec<String>,
}

/// Partial title update. `None` leaves the field untouched; `genres`
/// replaces the whole association set.
#[derive(Debug, Clone, Default)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i32,
    pub title_id: i32,
    pub author_id: i32,
    /// Author's username.
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub review_id: i32,
    pub author_id: i32,
    /// Author's username.
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: UserRole,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role,
            is_superuser: self.is_superuser,
        }
    }

    /// The state a confirmation code is bound to.
    pub fn fingerprint(&self) -> UserFingerprint<'_> {
        UserFingerprint {
            user_id: self.id,
            username: &self.username,
            email: &self.email,
            role: self.role.as_u8(),
            is_superuser: self.is_superuser,
            last_login: self.last_login.map(|t| t.timestamp_micros()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: UserRole,
}

/// Partial user update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// A plain-text message handed to the [`Mailer`](super::repository::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}
