use std::sync::Arc;

use shared::{
    domain::{Blog, UserId, UserProfile},
    protocol::{EngagementTotals, UpdateProfileRequest},
};
use tracing::info;

use crate::{api::BlogApi, error::ClientResult, session::Session, validation::validate_profile};

/// A public profile page: the user, their blogs and engagement totals.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub profile: UserProfile,
    pub blogs: Vec<Blog>,
    pub totals: EngagementTotals,
    pub is_own: bool,
}

pub struct Profiles {
    api: Arc<dyn BlogApi>,
    session: Session,
}

impl Profiles {
    pub fn new(api: Arc<dyn BlogApi>, session: Session) -> Self {
        Self { api, session }
    }

    pub async fn get(&self, user_id: &UserId) -> ClientResult<UserProfile> {
        self.api.profile(user_id).await
    }

    pub async fn page(&self, user_id: &UserId) -> ClientResult<ProfilePage> {
        let user_blogs = self.api.user_blogs(user_id).await?;
        let is_own = self.session.current_user_id().await? == Some(user_blogs.profile.id.clone());
        Ok(ProfilePage {
            totals: EngagementTotals::from_blogs(&user_blogs.blogs),
            profile: user_blogs.profile,
            blogs: user_blogs.blogs,
            is_own,
        })
    }

    /// Saves the signed-in user's profile and refreshes the remembered display
    /// name and email from the response.
    pub async fn update_own(&self, changes: UpdateProfileRequest) -> ClientResult<UserProfile> {
        validate_profile(&changes.full_name)?;
        let user_id = self.session.require_user().await?;
        let profile = self.api.update_profile(&user_id, &changes).await?;
        self.session
            .identity_store()
            .update_display(profile.display_name(), &profile.email)
            .await?;
        info!("profile: updated user={user_id}");
        Ok(profile)
    }
}

#[cfg(test)]
#[path = "tests/profile_tests.rs"]
mod tests;
