use std::sync::{Arc, LazyLock};

use regex::Regex;
use shared::{
    domain::{Blog, BlogId, UserId},
    protocol::{CreateBlogRequest, UpdateBlogRequest, UserBlogs},
};
use tracing::info;

use crate::{
    api::BlogApi,
    error::ClientResult,
    session::Session,
    validation::{validate_blog_edit, validate_new_blog, MAX_EXCERPT_CHARS},
};

const WORDS_PER_MINUTE: usize = 200;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern compiles"));

/// URL slug for a title: lowercase ascii alphanumerics joined by single dashes.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Minutes at 200 words per minute, rounded up; never less than one.
pub fn reading_time_minutes(text: &str) -> usize {
    text.split_whitespace()
        .count()
        .div_ceil(WORDS_PER_MINUTE)
        .max(1)
}

pub fn default_excerpt(description: &str) -> String {
    description.chars().take(MAX_EXCERPT_CHARS).collect()
}

/// Trims tags and drops blanks and repeats, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !normalized.iter().any(|seen| seen == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

/// Input of the create form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub image: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub publish: bool,
}

impl NewBlog {
    pub fn into_request(self, author: UserId) -> ClientResult<CreateBlogRequest> {
        let tags = normalize_tags(&self.tags);
        let excerpt = self.excerpt.filter(|excerpt| !excerpt.is_empty());
        validate_new_blog(
            &self.title,
            &self.description,
            &self.image,
            excerpt.as_deref(),
            &tags,
        )?;

        Ok(CreateBlogRequest {
            slug: slugify(&self.title),
            excerpt: excerpt.unwrap_or_else(|| default_excerpt(&self.description)),
            title: self.title,
            description: self.description,
            image: self.image,
            user: author,
            tags,
            is_published: self.publish,
        })
    }
}

/// Input of the edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogEdit {
    pub title: String,
    pub description: String,
    pub image: String,
}

impl BlogEdit {
    pub fn from_blog(blog: &Blog) -> Self {
        Self {
            title: blog.title.clone(),
            description: blog.description.clone(),
            image: blog.image.clone().unwrap_or_default(),
        }
    }
}

/// Create, edit and delete the signed-in user's blogs.
pub struct BlogAuthoring {
    api: Arc<dyn BlogApi>,
    session: Session,
}

impl BlogAuthoring {
    pub fn new(api: Arc<dyn BlogApi>, session: Session) -> Self {
        Self { api, session }
    }

    pub async fn create(&self, blog: NewBlog) -> ClientResult<Option<Blog>> {
        let author = self.session.require_user().await?;
        let request = blog.into_request(author)?;
        let created = self.api.create_blog(&request).await?;
        info!(
            "authoring: created blog slug={} published={}",
            request.slug, request.is_published
        );
        Ok(created)
    }

    pub async fn update(&self, blog_id: &BlogId, edit: BlogEdit) -> ClientResult<Option<Blog>> {
        let author = self.session.require_user().await?;
        validate_blog_edit(&edit.title, &edit.description, &edit.image)?;
        let updated = self
            .api
            .update_blog(
                blog_id,
                &UpdateBlogRequest {
                    title: edit.title,
                    description: edit.description,
                    image: edit.image,
                    user: author,
                },
            )
            .await?;
        info!("authoring: updated blog={blog_id}");
        Ok(updated)
    }

    pub async fn delete(&self, blog_id: &BlogId) -> ClientResult<()> {
        self.api.delete_blog(blog_id).await?;
        info!("authoring: deleted blog={blog_id}");
        Ok(())
    }

    /// The signed-in user's profile and blogs.
    pub async fn my_blogs(&self) -> ClientResult<UserBlogs> {
        let user_id = self.session.require_user().await?;
        self.api.user_blogs(&user_id).await
    }
}

#[cfg(test)]
#[path = "tests/authoring_tests.rs"]
mod tests;
