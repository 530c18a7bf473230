use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Identity, UserId};

use crate::KeyValueStore;

const USER_ID_KEY: &str = "userId";
const USER_NAME_KEY: &str = "userName";
const USER_EMAIL_KEY: &str = "userEmail";

/// The signed-in user, kept as three plain keys so other readers of the store
/// can pick out the user id alone.
#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn user_id(&self) -> Result<Option<UserId>> {
        Ok(self
            .store
            .get(USER_ID_KEY)
            .await?
            .filter(|id| !id.is_empty())
            .map(UserId::from))
    }

    pub async fn load(&self) -> Result<Option<Identity>> {
        let Some(user_id) = self.user_id().await? else {
            return Ok(None);
        };
        let user_name = self.store.get(USER_NAME_KEY).await?.unwrap_or_default();
        let user_email = self.store.get(USER_EMAIL_KEY).await?.unwrap_or_default();
        Ok(Some(Identity {
            user_id,
            user_name,
            user_email,
        }))
    }

    pub async fn save(&self, identity: &Identity) -> Result<()> {
        self.store.set(USER_ID_KEY, identity.user_id.as_str()).await?;
        self.store.set(USER_NAME_KEY, &identity.user_name).await?;
        self.store.set(USER_EMAIL_KEY, &identity.user_email).await
    }

    /// Rewrites the display fields after a profile edit, keeping the user id.
    pub async fn update_display(&self, user_name: &str, user_email: &str) -> Result<()> {
        self.store.set(USER_NAME_KEY, user_name).await?;
        self.store.set(USER_EMAIL_KEY, user_email).await
    }

    pub async fn clear(&self) -> Result<()> {
        for key in [USER_ID_KEY, USER_NAME_KEY, USER_EMAIL_KEY] {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}
