use client_core::{
    authoring::reading_time_minutes, dashboard::DashboardData, engagement::EngagementSnapshot,
    feed::FeedView, profile::ProfilePage, ShareLinks,
};
use shared::domain::{Blog, Comment, Draft, UserId};

fn counters(snapshot: &EngagementSnapshot) -> String {
    let heart = if snapshot.is_liked_by_current_user {
        "♥"
    } else {
        "♡"
    };
    format!(
        "{heart} {}  views {}  comments {}",
        snapshot.like_count, snapshot.view_count, snapshot.comment_count
    )
}

fn blog_line(blog: &Blog, current_user: Option<&UserId>) -> String {
    let snapshot = EngagementSnapshot::from_blog(blog, current_user);
    let own = if current_user.is_some_and(|user| blog.is_owned_by(user)) {
        "  (yours)"
    } else {
        ""
    };
    format!(
        "{}  {}  by {}  [{}]{own}",
        blog.id,
        blog.title,
        blog.author_name(),
        counters(&snapshot)
    )
}

pub fn feed(view: &FeedView<'_>, current_user: Option<&UserId>) {
    match view {
        FeedView::Loading => println!("Loading..."),
        FeedView::NoBlogs => println!("No blogs yet."),
        FeedView::NoResults { query } => println!("No blogs match \"{query}\"."),
        FeedView::Page(page) => {
            if let Some(label) = page.found_label() {
                println!("{label}");
            }
            for blog in &page.blogs {
                println!("{}", blog_line(blog, current_user));
            }
            if page.has_pagination() {
                println!("Page {} of {}", page.page, page.total_pages);
            }
        }
    }
}

pub fn comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments yet.");
        return;
    }
    for comment in comments {
        let when = comment
            .created_at
            .map(|at| format!(" ({})", at.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!("- {}{when}: {}", comment.author_name(), comment.text);
    }
}

pub fn blog_detail(blog: &Blog, snapshot: &EngagementSnapshot) {
    println!("{}", blog.title);
    println!(
        "by {}  ·  {} min read",
        blog.author_name(),
        reading_time_minutes(&blog.description)
    );
    if let Some(created_at) = blog.created_at {
        println!("published {}", created_at.format("%Y-%m-%d"));
    }
    if let Some(tags) = blog.tags.as_ref().filter(|tags| !tags.is_empty()) {
        println!("tags: {}", tags.join(", "));
    }
    println!();
    println!("{}", blog.description);
    println!();
    println!("{}", counters(snapshot));
}

pub fn drafts(drafts: &[Draft]) {
    if drafts.is_empty() {
        println!("No drafts saved.");
        return;
    }
    for draft in drafts {
        println!(
            "{}  {}  (saved {})",
            draft.id,
            draft.title,
            draft.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn profile(page: &ProfilePage, current_user: Option<&UserId>) {
    let profile = &page.profile;
    println!("{} (@{})", profile.display_name(), profile.username);
    for (label, value) in [
        ("bio", &profile.bio),
        ("location", &profile.location),
        ("website", &profile.website),
        ("occupation", &profile.occupation),
    ] {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            println!("{label}: {value}");
        }
    }
    println!(
        "posts {}  views {}  likes {}  comments {}",
        page.blogs.len(),
        page.totals.total_views,
        page.totals.total_likes,
        page.totals.total_comments
    );
    if page.is_own {
        println!("(this is you)");
    }
    for blog in &page.blogs {
        println!("{}", blog_line(blog, current_user));
    }
}

pub fn dashboard(data: &DashboardData) {
    println!("Welcome back, {}", data.identity.user_name);
    println!(
        "posts {}  views {}  likes {}  comments {}",
        data.total_posts(),
        data.totals.total_views,
        data.totals.total_likes,
        data.totals.total_comments
    );
    println!();
    println!("Your blogs:");
    if data.blogs.is_empty() {
        println!("No blogs yet.");
    }
    for blog in &data.blogs {
        println!("{}", blog_line(blog, Some(&data.identity.user_id)));
    }
    println!();
    println!("Drafts:");
    drafts(&data.drafts);
}

pub fn share(blog: &Blog, links: &ShareLinks) {
    println!("Share \"{}\"", blog.title);
    println!("link      {}", links.link);
    println!("twitter   {}", links.twitter);
    println!("facebook  {}", links.facebook);
    println!("linkedin  {}", links.linkedin);
}
