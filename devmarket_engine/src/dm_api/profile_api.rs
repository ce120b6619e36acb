use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Gig, GigId, NewGig, NewUser, User, UserId},
    traits::{UserApiError, UserManagement},
};

/// User profiles and gig publishing.
pub struct ProfileApi<B> {
    db: B,
}

impl<B> Debug for ProfileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileApi")
    }
}

impl<B> ProfileApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProfileApi<B>
where B: UserManagement
{
    pub async fn upsert_profile(&self, profile: NewUser) -> Result<User, UserApiError> {
        if profile.full_name.trim().is_empty() {
            return Err(UserApiError::InvalidProfile("full_name cannot be empty".into()));
        }
        if !profile.email.contains('@') {
            return Err(UserApiError::InvalidProfile(format!("{} is not an email address", profile.email)));
        }
        let user = self.db.upsert_user(profile).await?;
        debug!("👤️ Profile for {} saved", user.id);
        Ok(user)
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<User, UserApiError> {
        self.db.fetch_user(user_id).await?.ok_or_else(|| UserApiError::UserNotFound(user_id.clone()))
    }

    /// Publishes a gig for an existing freelancer.
    pub async fn publish_gig(&self, gig: NewGig) -> Result<Gig, UserApiError> {
        if self.db.fetch_user(&gig.freelancer_id).await?.is_none() {
            return Err(UserApiError::UserNotFound(gig.freelancer_id));
        }
        let gig = self.db.insert_gig(gig).await?;
        info!("👤️ {} published gig {} for {}", gig.freelancer_id, gig.id, gig.price);
        Ok(gig)
    }

    pub async fn gig(&self, gig_id: &GigId) -> Result<Gig, UserApiError> {
        self.db.fetch_gig_by_id(gig_id).await?.ok_or_else(|| UserApiError::GigNotFound(gig_id.clone()))
    }
}
