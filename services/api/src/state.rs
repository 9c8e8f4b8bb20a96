use sea_orm::DatabaseConnection;

use yamdb_auth_types::confirmation::ConfirmationCodes;

use crate::domain::types::TermKind;
use crate::infra::db::{
    DbCommentRepository, DbReviewRepository, DbTermRepository, DbTitleRepository,
    DbUserRepository,
};
use crate::infra::mail::LettreMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub codes: ConfirmationCodes,
    pub mailer: LettreMailer,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn term_repo(&self, kind: TermKind) -> DbTermRepository {
        DbTermRepository {
            db: self.db.clone(),
            kind,
        }
    }

    pub fn title_repo(&self) -> DbTitleRepository {
        DbTitleRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn comment_repo(&self) -> DbCommentRepository {
        DbCommentRepository {
            db: self.db.clone(),
        }
    }
}
