//! Like/view/comment state for a single blog card or detail view.
//!
//! The displayed counts start from the server snapshot. Likes are applied
//! optimistically and reverted when the backend does not confirm them; comments
//! are only shown once the backend returns the authoritative list.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use shared::{
    domain::{Blog, BlogId, Comment, UserId},
    protocol::{AddCommentRequest, IncrementViewsRequest, LikeBlogRequest},
};
use tokio::{
    sync::{watch, Mutex},
    time::Instant,
};
use storage::KeyValueStore;
use tracing::{info, warn};

use crate::{
    api::BlogApi,
    error::{ClientError, ClientResult},
    lifetime::ViewLifetime,
    validation::validate_comment,
};

pub const DEFAULT_VIEW_DEDUP_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementSnapshot {
    pub is_liked_by_current_user: bool,
    pub like_count: usize,
    pub view_count: u64,
    pub comment_count: usize,
}

impl EngagementSnapshot {
    pub fn from_blog(blog: &Blog, current_user: Option<&UserId>) -> Self {
        Self {
            is_liked_by_current_user: current_user.is_some_and(|user| blog.is_liked_by(user)),
            like_count: blog.like_count(),
            view_count: blog.views,
            comment_count: blog.comment_count(),
        }
    }

    fn flip_like(&mut self) {
        if self.is_liked_by_current_user {
            self.like_count = self.like_count.saturating_sub(1);
        } else {
            self.like_count += 1;
        }
        self.is_liked_by_current_user = !self.is_liked_by_current_user;
    }
}

/// Record of when each (user, blog) pair last counted a view.
///
/// With a backing store the timestamps are also persisted as wall-clock
/// milliseconds under `viewed_blog:{user}:{blog}`, so the window holds across
/// processes sharing that store.
pub struct ViewTracker {
    window: Duration,
    last_counted: Mutex<HashMap<(UserId, BlogId), Instant>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Default for ViewTracker {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_DEDUP_WINDOW)
    }
}

pub fn viewed_key(user_id: &UserId, blog_id: &BlogId) -> String {
    format!("viewed_blog:{user_id}:{blog_id}")
}

impl ViewTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_counted: Mutex::new(HashMap::new()),
            store: None,
        }
    }

    pub fn persistent(window: Duration, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(window)
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Marks the pair as counted now, unless it was counted within the window.
    pub async fn try_mark(&self, user_id: &UserId, blog_id: &BlogId) -> bool {
        let now = Instant::now();
        let mut guard = self.last_counted.lock().await;
        guard.retain(|_, last| now.duration_since(*last) <= self.window);

        let key = (user_id.clone(), blog_id.clone());
        if guard.contains_key(&key) {
            return false;
        }
        if let Some(store) = self.store.as_deref() {
            if !self.mark_stored(store, user_id, blog_id).await {
                return false;
            }
        }
        guard.insert(key, now);
        true
    }

    async fn mark_stored(
        &self,
        store: &dyn KeyValueStore,
        user_id: &UserId,
        blog_id: &BlogId,
    ) -> bool {
        let key = viewed_key(user_id, blog_id);
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);

        match store.get(&key).await {
            Ok(Some(raw)) => {
                if let Ok(last_ms) = raw.trim().parse::<i64>() {
                    let elapsed = now_ms - last_ms;
                    if (0..=window_ms).contains(&elapsed) {
                        return false;
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warn!("engagement: view marker unreadable key={key} error={err:#}"),
        }

        if let Err(err) = store.set(&key, &now_ms.to_string()).await {
            warn!("engagement: view marker not saved key={key} error={err:#}");
        }
        true
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.last_counted.lock().await.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRecord {
    /// The increment request was sent and acknowledged.
    Counted,
    /// Same user and blog within the de-duplication window.
    Duplicate,
    /// Views are only counted for signed-in users.
    Anonymous,
    /// The request failed; logged and otherwise ignored.
    Failed,
}

/// Engagement state of one blog as shown in one view.
pub struct BlogEngagement {
    api: Arc<dyn BlogApi>,
    views: Arc<ViewTracker>,
    lifetime: ViewLifetime,
    blog_id: BlogId,
    current_user: Option<UserId>,
    comments: Vec<Comment>,
    snapshot: watch::Sender<EngagementSnapshot>,
}

impl BlogEngagement {
    pub fn from_blog(
        api: Arc<dyn BlogApi>,
        views: Arc<ViewTracker>,
        lifetime: ViewLifetime,
        blog: &Blog,
        current_user: Option<UserId>,
    ) -> Self {
        let snapshot = EngagementSnapshot::from_blog(blog, current_user.as_ref());
        let (snapshot, _) = watch::channel(snapshot);
        Self {
            api,
            views,
            lifetime,
            blog_id: blog.id.clone(),
            current_user,
            comments: blog.comments.clone(),
            snapshot,
        }
    }

    /// Detail view entry point: fetches the blog, builds its state and counts
    /// the view.
    pub async fn load(
        api: Arc<dyn BlogApi>,
        views: Arc<ViewTracker>,
        lifetime: ViewLifetime,
        blog_id: &BlogId,
        current_user: Option<UserId>,
    ) -> ClientResult<(Blog, Self)> {
        let blog = lifetime.run(api.blog(blog_id)).await?;
        let engagement = Self::from_blog(api, views, lifetime, &blog, current_user);
        engagement.record_view().await;
        Ok((blog, engagement))
    }

    pub fn blog_id(&self) -> &BlogId {
        &self.blog_id
    }

    pub fn snapshot(&self) -> EngagementSnapshot {
        *self.snapshot.borrow()
    }

    /// Follows every change, including optimistic ones while a request is in
    /// flight.
    pub fn subscribe(&self) -> watch::Receiver<EngagementSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    fn require_user(&self) -> ClientResult<UserId> {
        self.current_user
            .clone()
            .ok_or(ClientError::Unauthenticated)
    }

    /// Flips the like immediately, then asks the backend to do the same. The
    /// flip is undone if the backend does not confirm it.
    pub async fn toggle_like(&mut self) -> ClientResult<EngagementSnapshot> {
        let user_id = self.require_user()?;
        let before = self.snapshot();
        self.snapshot.send_modify(EngagementSnapshot::flip_like);

        let request = LikeBlogRequest {
            blog_id: self.blog_id.clone(),
            user_id,
        };
        match self.lifetime.run(self.api.like_blog(&request)).await {
            Ok(()) => {
                let after = self.snapshot();
                info!(
                    "engagement: like confirmed blog={} liked={} likes={}",
                    self.blog_id, after.is_liked_by_current_user, after.like_count
                );
                Ok(after)
            }
            Err(err) => {
                self.snapshot.send_modify(|snapshot| {
                    snapshot.is_liked_by_current_user = before.is_liked_by_current_user;
                    snapshot.like_count = before.like_count;
                });
                warn!(
                    "engagement: like reverted blog={} error={err}",
                    self.blog_id
                );
                Err(err)
            }
        }
    }

    /// Counts a view at most once per user and blog within the tracker window.
    /// Never fails; problems are logged.
    pub async fn record_view(&self) -> ViewRecord {
        let Some(user_id) = self.current_user.as_ref() else {
            return ViewRecord::Anonymous;
        };
        if !self.views.try_mark(user_id, &self.blog_id).await {
            return ViewRecord::Duplicate;
        }

        let request = IncrementViewsRequest {
            blog_id: self.blog_id.clone(),
        };
        match self.lifetime.run(self.api.increment_views(&request)).await {
            Ok(()) => ViewRecord::Counted,
            Err(err) => {
                warn!(
                    "engagement: view tracking failed blog={} error={err}",
                    self.blog_id
                );
                ViewRecord::Failed
            }
        }
    }

    /// Posts a comment and replaces the local list with the one the backend
    /// returns. Blank text is rejected without a request.
    pub async fn add_comment(&mut self, text: &str) -> ClientResult<&[Comment]> {
        let user_id = self.require_user()?;
        let text = validate_comment(text)?;

        let request = AddCommentRequest {
            blog_id: self.blog_id.clone(),
            user_id,
            text: text.to_string(),
        };
        let blog = self.lifetime.run(self.api.add_comment(&request)).await?;

        self.comments = blog.comments;
        let comment_count = self.comments.len();
        self.snapshot
            .send_modify(|snapshot| snapshot.comment_count = comment_count);
        info!(
            "engagement: comment added blog={} comments={comment_count}",
            self.blog_id
        );
        Ok(&self.comments)
    }
}

#[cfg(test)]
#[path = "tests/engagement_tests.rs"]
mod tests;
