use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::domain::{Draft, UserId};
use tracing::warn;

use crate::{load_json, save_json, KeyValueStore};

const GUEST_SCOPE: &str = "guest";

/// Storage key holding the draft list of `user_id`, or of the guest scope.
pub fn drafts_key(user_id: Option<&UserId>) -> String {
    let scope = user_id.map(UserId::as_str).unwrap_or(GUEST_SCOPE);
    format!("dashboard:drafts:{scope}")
}

/// Drafts of a single user, newest first.
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl DraftStore {
    pub fn for_user(store: Arc<dyn KeyValueStore>, user_id: Option<&UserId>) -> Self {
        Self {
            store,
            key: drafts_key(user_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// An unreadable list is treated as empty and overwritten on the next save.
    pub async fn list(&self) -> Result<Vec<Draft>> {
        match load_json::<Vec<Draft>>(self.store.as_ref(), &self.key).await {
            Ok(drafts) => Ok(drafts.unwrap_or_default()),
            Err(err) if err.is::<serde_json::Error>() => {
                warn!("drafts: discarding unreadable draft list key={} error={err:#}", self.key);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Draft>> {
        Ok(self.list().await?.into_iter().find(|draft| draft.id == id))
    }

    /// Prepends a draft. Returns `None` without writing when the trimmed title
    /// or description is empty.
    pub async fn save(
        &self,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() || description.is_empty() {
            return Ok(None);
        }

        let mut drafts = self.list().await?;
        let draft = Draft {
            id: next_draft_id(&drafts, now),
            title: title.to_string(),
            description: description.to_string(),
            created_at: now,
        };
        drafts.insert(0, draft.clone());
        save_json(self.store.as_ref(), &self.key, &drafts).await?;
        Ok(Some(draft))
    }

    /// Removes the draft with `id` and returns what remains.
    pub async fn delete(&self, id: &str) -> Result<Vec<Draft>> {
        let mut drafts = self.list().await?;
        drafts.retain(|draft| draft.id != id);
        save_json(self.store.as_ref(), &self.key, &drafts).await?;
        Ok(drafts)
    }
}

/// Millisecond timestamp ids, bumped past any id already taken.
fn next_draft_id(existing: &[Draft], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    while existing
        .iter()
        .any(|draft| draft.id == candidate.to_string())
    {
        candidate += 1;
    }
    candidate.to_string()
}
