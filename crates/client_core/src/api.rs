use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Blog, BlogId, UserId, UserProfile},
    error::ApiError,
    protocol::{
        Ack, AddCommentRequest, BlogListPayload, BlogPayload, CreateBlogRequest, EngagementTotals,
        EnvelopeStatus, IncrementViewsRequest, LikeBlogRequest, LoginRequest, MaybeBlogPayload,
        RegisterRequest, StatsPayload, UpdateBlogRequest, UpdateProfileRequest, UserBlogs,
        UserBlogsPayload, UserPayload,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Every backend call the client makes. Implementations do no retries.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn all_blogs(&self) -> ClientResult<Vec<Blog>>;
    async fn blog(&self, blog_id: &BlogId) -> ClientResult<Blog>;
    async fn user_blogs(&self, user_id: &UserId) -> ClientResult<UserBlogs>;
    async fn create_blog(&self, request: &CreateBlogRequest) -> ClientResult<Option<Blog>>;
    async fn update_blog(
        &self,
        blog_id: &BlogId,
        request: &UpdateBlogRequest,
    ) -> ClientResult<Option<Blog>>;
    async fn delete_blog(&self, blog_id: &BlogId) -> ClientResult<()>;
    /// Toggles membership of the user in the blog's likes.
    async fn like_blog(&self, request: &LikeBlogRequest) -> ClientResult<()>;
    async fn increment_views(&self, request: &IncrementViewsRequest) -> ClientResult<()>;
    /// Returns the blog with its full, server-ordered comment list.
    async fn add_comment(&self, request: &AddCommentRequest) -> ClientResult<Blog>;
    async fn user_stats(&self, user_id: &UserId) -> ClientResult<EngagementTotals>;
    async fn login(&self, request: &LoginRequest) -> ClientResult<UserProfile>;
    async fn register(&self, request: &RegisterRequest) -> ClientResult<UserProfile>;
    async fn profile(&self, user_id: &UserId) -> ClientResult<UserProfile>;
    async fn update_profile(
        &self,
        user_id: &UserId,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile>;
}

/// `BlogApi` over HTTP with JSON envelopes.
#[derive(Clone)]
pub struct HttpBlogApi {
    http: Client,
    base_url: Url,
}

impl HttpBlogApi {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: Client) -> ClientResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("api: request method={method} url={url}");
        self.http.request(method, url)
    }

    async fn send<T>(&self, request: RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }

    async fn get<T>(&self, segments: &[&str]) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(self.request(Method::GET, segments)).await
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.request(method, segments).json(body)).await
    }
}

/// Turns a response into its payload, classifying anything that is not a
/// 2xx envelope with `success: true` as a soft failure.
pub fn decode_envelope<T>(status: u16, body: &str) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let is_2xx = (200..300).contains(&status);
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) if is_2xx => return Err(ClientError::Decode(err)),
        Err(_) => {
            warn!("api: non-json error response status={status}");
            return Err(ApiError::soft_failure(Some(status), None).into());
        }
    };

    let envelope = envelope_status(&value);
    if !is_2xx || !envelope.success {
        let err = ApiError::soft_failure(
            (!is_2xx).then_some(status),
            envelope.message.as_deref(),
        );
        warn!("api: soft failure status={status} message={}", err.message);
        return Err(err.into());
    }

    Ok(serde_json::from_value(value)?)
}

/// A body that is not an object, or has a non-boolean `success`, reads as not
/// successful.
fn envelope_status(value: &serde_json::Value) -> EnvelopeStatus {
    EnvelopeStatus {
        success: value
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
        message: value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
    }
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    async fn all_blogs(&self) -> ClientResult<Vec<Blog>> {
        let payload: BlogListPayload = self.get(&["api", "v1", "blog", "all-blog"]).await?;
        Ok(payload.blogs)
    }

    async fn blog(&self, blog_id: &BlogId) -> ClientResult<Blog> {
        let payload: BlogPayload = self
            .get(&["api", "v1", "blog", "get-blog", blog_id.as_str()])
            .await?;
        Ok(payload.blog)
    }

    async fn user_blogs(&self, user_id: &UserId) -> ClientResult<UserBlogs> {
        let payload: UserBlogsPayload = self
            .get(&["api", "v1", "blog", "user-blog", user_id.as_str()])
            .await?;
        Ok(payload.user_blog)
    }

    async fn create_blog(&self, request: &CreateBlogRequest) -> ClientResult<Option<Blog>> {
        let payload: MaybeBlogPayload = self
            .send_json(Method::POST, &["api", "v1", "blog", "create-blog"], request)
            .await?;
        Ok(payload.blog)
    }

    async fn update_blog(
        &self,
        blog_id: &BlogId,
        request: &UpdateBlogRequest,
    ) -> ClientResult<Option<Blog>> {
        let payload: MaybeBlogPayload = self
            .send_json(
                Method::PUT,
                &["api", "v1", "blog", "update-blog", blog_id.as_str()],
                request,
            )
            .await?;
        Ok(payload.blog)
    }

    async fn delete_blog(&self, blog_id: &BlogId) -> ClientResult<()> {
        let _: Ack = self
            .send(self.request(
                Method::DELETE,
                &["api", "v1", "blog", "delete-blog", blog_id.as_str()],
            ))
            .await?;
        Ok(())
    }

    async fn like_blog(&self, request: &LikeBlogRequest) -> ClientResult<()> {
        let _: Ack = self
            .send_json(Method::POST, &["api", "v1", "blog", "like-blog"], request)
            .await?;
        Ok(())
    }

    async fn increment_views(&self, request: &IncrementViewsRequest) -> ClientResult<()> {
        let _: Ack = self
            .send_json(Method::POST, &["api", "v1", "blog", "increment-views"], request)
            .await?;
        Ok(())
    }

    async fn add_comment(&self, request: &AddCommentRequest) -> ClientResult<Blog> {
        let payload: BlogPayload = self
            .send_json(Method::POST, &["api", "v1", "blog", "add-comment"], request)
            .await?;
        Ok(payload.blog)
    }

    async fn user_stats(&self, user_id: &UserId) -> ClientResult<EngagementTotals> {
        let payload: StatsPayload = self
            .get(&["api", "v1", "blog", "stats", user_id.as_str()])
            .await?;
        Ok(payload.stats)
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<UserProfile> {
        let payload: UserPayload = self
            .send_json(Method::POST, &["api", "v1", "user", "login"], request)
            .await?;
        Ok(payload.user)
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<UserProfile> {
        let payload: UserPayload = self
            .send_json(Method::POST, &["api", "v1", "user", "register"], request)
            .await?;
        Ok(payload.user)
    }

    async fn profile(&self, user_id: &UserId) -> ClientResult<UserProfile> {
        let payload: UserPayload = self
            .get(&["api", "v1", "user", "profile", user_id.as_str()])
            .await?;
        Ok(payload.user)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile> {
        let payload: UserPayload = self
            .send_json(
                Method::PUT,
                &["api", "v1", "user", "profile", user_id.as_str()],
                request,
            )
            .await?;
        Ok(payload.user)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
