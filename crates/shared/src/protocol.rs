use serde::{Deserialize, Serialize};

use crate::domain::{Blog, BlogId, UserId, UserProfile};

/// Status fields every backend response carries next to its payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvelopeStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogListPayload {
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPayload {
    pub blog: Blog,
}

/// Create/update responses may or may not echo the stored blog back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaybeBlogPayload {
    #[serde(default)]
    pub blog: Option<Blog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: UserProfile,
}

/// A user profile together with the blogs the user authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBlogs {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBlogsPayload {
    pub user_blog: UserBlogs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementTotals {
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub total_comments: u64,
}

impl EngagementTotals {
    pub fn from_blogs(blogs: &[Blog]) -> Self {
        blogs.iter().fold(Self::default(), |mut totals, blog| {
            totals.total_views += blog.views;
            totals.total_likes += blog.like_count() as u64;
            totals.total_comments += blog.comment_count() as u64;
            totals
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsPayload {
    pub stats: EngagementTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: String,
    pub description: String,
    pub image: String,
    pub user: UserId,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: String,
    pub description: String,
    pub image: String,
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBlogRequest {
    pub blog_id: BlogId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementViewsRequest {
    pub blog_id: BlogId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub blog_id: BlogId,
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
