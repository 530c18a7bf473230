//! Links for sharing a blog: its public page plus the social share intents.

use shared::domain::Blog;
use url::Url;

use crate::error::{ClientError, ClientResult};

const TWITTER_INTENT: &str = "https://twitter.com/intent/tweet";
const FACEBOOK_SHARER: &str = "https://www.facebook.com/sharer/sharer.php";
const LINKEDIN_SHARER: &str = "https://www.linkedin.com/sharing/share-offsite/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    /// Public page of the blog, the one copied to the clipboard.
    pub link: Url,
    pub twitter: Url,
    pub facebook: Url,
    pub linkedin: Url,
}

/// `{site_url}/blog-details/{id}`, keeping any path prefix of `site_url`.
pub fn blog_link(site_url: &str, blog: &Blog) -> ClientResult<Url> {
    let mut link = Url::parse(site_url.trim())
        .map_err(|_| ClientError::InvalidBaseUrl(site_url.to_string()))?;
    if !matches!(link.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl(site_url.to_string()));
    }
    link.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl(site_url.to_string()))?
        .pop_if_empty()
        .extend(["blog-details", blog.id.as_str()]);
    link.set_query(None);
    link.set_fragment(None);
    Ok(link)
}

pub fn share_links(site_url: &str, blog: &Blog) -> ClientResult<ShareLinks> {
    let link = blog_link(site_url, blog)?;
    let text = format!("Check out this blog: {}", blog.title);
    Ok(ShareLinks {
        twitter: intent(TWITTER_INTENT, &[("text", &text), ("url", link.as_str())])?,
        facebook: intent(FACEBOOK_SHARER, &[("u", link.as_str())])?,
        linkedin: intent(LINKEDIN_SHARER, &[("url", link.as_str())])?,
        link,
    })
}

fn intent(base: &str, params: &[(&str, &str)]) -> ClientResult<Url> {
    Url::parse_with_params(base, params).map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))
}

#[cfg(test)]
#[path = "tests/share_tests.rs"]
mod tests;
