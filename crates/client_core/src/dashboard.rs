use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{Blog, Draft, Identity},
    protocol::EngagementTotals,
};
use storage::{DraftStore, KeyValueStore};
use tracing::warn;

use crate::{
    api::BlogApi,
    error::{ClientError, ClientResult},
    session::Session,
};

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub identity: Identity,
    pub blogs: Vec<Blog>,
    pub totals: EngagementTotals,
    pub drafts: Vec<Draft>,
}

impl DashboardData {
    pub fn total_posts(&self) -> usize {
        self.blogs.len()
    }
}

/// The signed-in user's own blogs, totals and local drafts.
pub struct Dashboard {
    api: Arc<dyn BlogApi>,
    session: Session,
    store: Arc<dyn KeyValueStore>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn BlogApi>, session: Session, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            session,
            store,
        }
    }

    async fn drafts(&self) -> ClientResult<DraftStore> {
        let user_id = self.session.current_user_id().await?;
        Ok(DraftStore::for_user(Arc::clone(&self.store), user_id.as_ref()))
    }

    /// Totals come from the stats endpoint; if that fails they are summed
    /// from the user's blogs instead. When the blogs cannot be fetched either,
    /// the dashboard still loads with an empty list and the local drafts.
    pub async fn load(&self) -> ClientResult<DashboardData> {
        let identity = self
            .session
            .current()
            .await?
            .ok_or(ClientError::Unauthenticated)?;
        let blogs = match self.api.user_blogs(&identity.user_id).await {
            Ok(user_blogs) => user_blogs.blogs,
            Err(err) => {
                warn!(
                    "dashboard: blogs unavailable user={} error={err}",
                    identity.user_id
                );
                Vec::new()
            }
        };

        let totals = match self.api.user_stats(&identity.user_id).await {
            Ok(totals) => totals,
            Err(err) => {
                warn!("dashboard: stats unavailable, summing locally error={err}");
                EngagementTotals::from_blogs(&blogs)
            }
        };

        let drafts = self.drafts().await?.list().await?;
        Ok(DashboardData {
            identity,
            blogs,
            totals,
            drafts,
        })
    }

    pub async fn list_drafts(&self) -> ClientResult<Vec<Draft>> {
        Ok(self.drafts().await?.list().await?)
    }

    /// `None` when the title or description is blank.
    pub async fn save_draft(&self, title: &str, description: &str) -> ClientResult<Option<Draft>> {
        Ok(self
            .drafts()
            .await?
            .save(title, description, Utc::now())
            .await?)
    }

    pub async fn delete_draft(&self, id: &str) -> ClientResult<Vec<Draft>> {
        Ok(self.drafts().await?.delete(id).await?)
    }

    /// The draft's content, to load back into the editor.
    pub async fn resume_draft(&self, id: &str) -> ClientResult<Option<Draft>> {
        Ok(self.drafts().await?.get(id).await?)
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
