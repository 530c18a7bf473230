//! Feed assembly: the full blog collection sorted by popularity, narrowed by
//! a free-text query and cut into fixed-size pages.

use std::sync::Arc;

use shared::domain::{Blog, UserId};
use tracing::{info, warn};

use crate::{api::BlogApi, error::ClientResult, lifetime::ViewLifetime};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Stable sort by descending view count; equal counts keep their input order.
pub fn sort_by_views(blogs: &mut [Blog]) {
    blogs.sort_by(|a, b| b.views.cmp(&a.views));
}

/// Case-insensitive substring match on title, description and author name.
/// An empty query matches everything.
pub fn matches_query(blog: &Blog, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [blog.title.as_str(), blog.description.as_str(), blog.author_name()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1))
}

/// Clamps a 1-based page index into the valid range. An empty result still
/// has page 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedView<'a> {
    /// The initial fetch has not completed yet.
    Loading,
    /// The backend has no blogs at all.
    NoBlogs,
    /// Blogs exist but none match the query.
    NoResults { query: &'a str },
    Page(FeedPage<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage<'a> {
    pub blogs: Vec<&'a Blog>,
    pub page: usize,
    pub total_pages: usize,
    /// Number of blogs matching the query across all pages.
    pub result_count: usize,
    pub query: &'a str,
}

impl FeedPage<'_> {
    /// "Found N blogs", shown only while a query is active.
    pub fn found_label(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        let plural = if self.result_count == 1 { "" } else { "s" };
        Some(format!("Found {} blog{plural}", self.result_count))
    }

    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

/// Holds the sorted collection and the current query/page selection.
///
/// Sorting happens once when blogs arrive and filtering once per query change;
/// moving between pages only re-slices.
#[derive(Debug, Clone)]
pub struct FeedAssembler {
    blogs: Option<Vec<Blog>>,
    query: String,
    matching: Vec<usize>,
    page: usize,
    page_size: usize,
}

impl Default for FeedAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedAssembler {
    pub fn new(page_size: usize) -> Self {
        Self {
            blogs: None,
            query: String::new(),
            matching: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.blogs.is_some()
    }

    pub fn set_blogs(&mut self, mut blogs: Vec<Blog>) {
        sort_by_views(&mut blogs);
        self.blogs = Some(blogs);
        self.refilter();
        self.page = clamp_page(self.page, self.total_pages());
    }

    /// Changing the query returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.query {
            return;
        }
        self.query = query;
        self.refilter();
        self.page = 1;
    }

    /// Selects a page, clamped into range. Returns the page actually selected.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.page = clamp_page(page, self.total_pages());
        self.page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn result_count(&self) -> usize {
        self.matching.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.matching.len(), self.page_size)
    }

    /// Every blog matching the query, in feed order.
    pub fn matching(&self) -> impl Iterator<Item = &Blog> {
        let blogs = self.blogs.as_deref().unwrap_or_default();
        self.matching.iter().map(move |&index| &blogs[index])
    }

    pub fn view(&self) -> FeedView<'_> {
        let Some(blogs) = self.blogs.as_deref() else {
            return FeedView::Loading;
        };
        if blogs.is_empty() {
            return FeedView::NoBlogs;
        }
        if self.matching.is_empty() {
            return FeedView::NoResults { query: &self.query };
        }

        let start = (self.page - 1) * self.page_size;
        let page_blogs = self
            .matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&index| &blogs[index])
            .collect();

        FeedView::Page(FeedPage {
            blogs: page_blogs,
            page: self.page,
            total_pages: self.total_pages(),
            result_count: self.matching.len(),
            query: &self.query,
        })
    }

    fn refilter(&mut self) {
        let blogs = self.blogs.as_deref().unwrap_or_default();
        self.matching = blogs
            .iter()
            .enumerate()
            .filter(|(_, blog)| matches_query(blog, &self.query))
            .map(|(index, _)| index)
            .collect();
    }
}

/// The explore page: fetches the collection once and serves views from it.
pub struct Feed {
    api: Arc<dyn BlogApi>,
    lifetime: ViewLifetime,
    assembler: FeedAssembler,
    current_user: Option<UserId>,
}

impl Feed {
    pub fn new(
        api: Arc<dyn BlogApi>,
        lifetime: ViewLifetime,
        page_size: usize,
        current_user: Option<UserId>,
    ) -> Self {
        Self {
            api,
            lifetime,
            assembler: FeedAssembler::new(page_size),
            current_user,
        }
    }

    /// Fetches all blogs. A failed fetch leaves an empty, loaded feed and
    /// returns the error for the caller to report.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let api = Arc::clone(&self.api);
        match self.lifetime.run(api.all_blogs()).await {
            Ok(blogs) => {
                info!("feed: loaded blogs count={}", blogs.len());
                self.assembler.set_blogs(blogs);
                Ok(())
            }
            Err(err) => {
                warn!("feed: failed to load blogs error={err}");
                if !self.lifetime.is_closed() && !self.assembler.is_loaded() {
                    self.assembler.set_blogs(Vec::new());
                }
                Err(err)
            }
        }
    }

    pub fn assembler(&self) -> &FeedAssembler {
        &self.assembler
    }

    pub fn assembler_mut(&mut self) -> &mut FeedAssembler {
        &mut self.assembler
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    pub fn current_user(&self) -> Option<&UserId> {
        self.current_user.as_ref()
    }

    /// Whether the signed-in user authored `blog`, which enables edit/delete.
    pub fn is_own(&self, blog: &Blog) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| blog.is_owned_by(user))
    }

    pub fn view(&self) -> FeedView<'_> {
        self.assembler.view()
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
