use thiserror::Error;

use crate::db_types::{Gig, GigId, NewGig, NewUser, User, UserId};

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(UserId),
    #[error("Gig {0} does not exist")]
    GigNotFound(GigId),
    #[error("The email address {0} is already in use")]
    EmailInUse(String),
    #[error("Invalid profile. {0}")]
    InvalidProfile(String),
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Creates the user if the id is new, otherwise updates the profile fields. `is_admin` and `created_at` are never
    /// changed by an upsert.
    async fn upsert_user(&self, user: NewUser) -> Result<User, UserApiError>;

    async fn fetch_user(&self, user_id: &UserId) -> Result<Option<User>, UserApiError>;

    async fn insert_gig(&self, gig: NewGig) -> Result<Gig, UserApiError>;

    async fn fetch_gig_by_id(&self, gig_id: &GigId) -> Result<Option<Gig>, UserApiError>;
}
