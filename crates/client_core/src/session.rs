use std::sync::Arc;

use shared::{
    domain::{Identity, UserId, UserProfile},
    protocol::{LoginRequest, RegisterRequest},
};
use storage::IdentityStore;
use tracing::info;

use crate::{
    api::BlogApi,
    error::{ClientError, ClientResult},
    validation::{validate_login, validate_registration},
};

/// Signs users in and out and remembers who is signed in.
#[derive(Clone)]
pub struct Session {
    api: Arc<dyn BlogApi>,
    identity: IdentityStore,
}

fn identity_from_profile(profile: &UserProfile) -> Identity {
    Identity {
        user_id: profile.id.clone(),
        user_name: profile.username.clone(),
        user_email: profile.email.clone(),
    }
}

impl Session {
    pub fn new(api: Arc<dyn BlogApi>, identity: IdentityStore) -> Self {
        Self { api, identity }
    }

    pub fn identity_store(&self) -> &IdentityStore {
        &self.identity
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Identity> {
        validate_login(email, password)?;
        let profile = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        let identity = identity_from_profile(&profile);
        self.identity.save(&identity).await?;
        info!("session: logged in user={}", identity.user_id);
        Ok(identity)
    }

    /// Creates the account and signs it in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<Identity> {
        validate_registration(username, email, password)?;
        let profile = self
            .api
            .register(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        let identity = identity_from_profile(&profile);
        self.identity.save(&identity).await?;
        info!("session: registered user={}", identity.user_id);
        Ok(identity)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.identity.clear().await?;
        info!("session: logged out");
        Ok(())
    }

    pub async fn current(&self) -> ClientResult<Option<Identity>> {
        Ok(self.identity.load().await?)
    }

    pub async fn current_user_id(&self) -> ClientResult<Option<UserId>> {
        Ok(self.identity.user_id().await?)
    }

    pub async fn require_user(&self) -> ClientResult<UserId> {
        self.current_user_id()
            .await?
            .ok_or(ClientError::Unauthenticated)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
