use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, share_links, BlogApi, BlogAuthoring, BlogEdit, BlogEngagement, ClientError,
    Dashboard, Feed, HttpBlogApi, NewBlog, Profiles, Session, ViewLifetime, ViewTracker,
};
use shared::{
    domain::{BlogId, UserId},
    protocol::UpdateProfileRequest,
};
use storage::{IdentityStore, KeyValueStore, Storage};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "blog", about = "Terminal client for the blogging backend")]
struct Cli {
    /// Settings file; defaults to ./blog.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most viewed blogs, optionally filtered.
    Feed {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    Show {
        blog_id: String,
    },
    /// Likes the blog, or removes an existing like.
    Like {
        blog_id: String,
    },
    Comment {
        blog_id: String,
        text: String,
    },
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Save unpublished.
        #[arg(long)]
        draft: bool,
    },
    Edit {
        blog_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        blog_id: String,
    },
    /// Link to the blog page and its social share links.
    Share {
        blog_id: String,
    },
    /// Public profile; your own when no id is given.
    Profile {
        user_id: Option<String>,
    },
    UpdateProfile {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    Dashboard,
    Drafts {
        #[command(subcommand)]
        action: DraftCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    List,
    Save { title: String, description: String },
    /// Prints a draft so it can be pasted back into `create`.
    Resume { id: String },
    Delete { id: String },
}

struct App {
    api: Arc<dyn BlogApi>,
    store: Arc<dyn KeyValueStore>,
    session: Session,
    page_size: usize,
    site_url: String,
    views: Arc<ViewTracker>,
}

/// Reduces a client error to the one-line notification, keeping the detail in
/// the debug log.
fn notify(err: ClientError, fallback: &str) -> anyhow::Error {
    debug!("cli: command failed error={err:?}");
    anyhow!(err.user_message(fallback))
}

impl App {
    async fn current_user(&self) -> Result<Option<UserId>> {
        self.session
            .current_user_id()
            .await
            .map_err(|err| notify(err, "Could not read the saved session"))
    }

    fn authoring(&self) -> BlogAuthoring {
        BlogAuthoring::new(Arc::clone(&self.api), self.session.clone())
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            Arc::clone(&self.api),
            self.session.clone(),
            Arc::clone(&self.store),
        )
    }

    async fn engagement(&self, blog_id: &str) -> Result<BlogEngagement> {
        let blog = self
            .api
            .blog(&BlogId::from(blog_id))
            .await
            .map_err(|err| notify(err, "Failed to load blog"))?;
        Ok(BlogEngagement::from_blog(
            Arc::clone(&self.api),
            Arc::clone(&self.views),
            ViewLifetime::new(),
            &blog,
            self.current_user().await?,
        ))
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Feed { query, page } => {
                let current_user = self.current_user().await?;
                let mut feed = Feed::new(
                    Arc::clone(&self.api),
                    ViewLifetime::new(),
                    self.page_size,
                    current_user.clone(),
                );
                if let Err(err) = feed.refresh().await {
                    eprintln!("{}", err.user_message("Failed to load blogs"));
                }
                feed.assembler_mut().set_query(query);
                feed.assembler_mut().go_to_page(page);
                render::feed(&feed.view(), current_user.as_ref());
            }
            Command::Show { blog_id } => {
                let (blog, engagement) = BlogEngagement::load(
                    Arc::clone(&self.api),
                    Arc::clone(&self.views),
                    ViewLifetime::new(),
                    &BlogId::from(blog_id),
                    self.current_user().await?,
                )
                .await
                .map_err(|err| notify(err, "Failed to load blog"))?;
                render::blog_detail(&blog, &engagement.snapshot());
                println!();
                render::comments(engagement.comments());
            }
            Command::Like { blog_id } => {
                let mut engagement = self.engagement(&blog_id).await?;
                let snapshot = engagement
                    .toggle_like()
                    .await
                    .map_err(|err| notify(err, "Failed to update like"))?;
                let verb = if snapshot.is_liked_by_current_user {
                    "Liked"
                } else {
                    "Removed like from"
                };
                println!("{verb} {blog_id} ({} likes)", snapshot.like_count);
            }
            Command::Comment { blog_id, text } => {
                let mut engagement = self.engagement(&blog_id).await?;
                let comments = engagement
                    .add_comment(&text)
                    .await
                    .map_err(|err| notify(err, "Failed to add comment"))?;
                println!("Comment added successfully");
                render::comments(comments);
            }
            Command::Login { email, password } => {
                let identity = self
                    .session
                    .login(&email, &password)
                    .await
                    .map_err(|err| notify(err, "Login failed. Please try again."))?;
                println!("Welcome back, {}", identity.user_name);
            }
            Command::Register {
                username,
                email,
                password,
            } => {
                let identity = self
                    .session
                    .register(&username, &email, &password)
                    .await
                    .map_err(|err| notify(err, "Registration failed. Please try again."))?;
                println!("Account created. Signed in as {}", identity.user_name);
            }
            Command::Logout => {
                self.session
                    .logout()
                    .await
                    .map_err(|err| notify(err, "Logout failed"))?;
                println!("Logged out");
            }
            Command::Whoami => match self
                .session
                .current()
                .await
                .map_err(|err| notify(err, "Could not read the saved session"))?
            {
                Some(identity) => println!(
                    "{} <{}> ({})",
                    identity.user_name, identity.user_email, identity.user_id
                ),
                None => println!("Not logged in"),
            },
            Command::Create {
                title,
                description,
                image,
                excerpt,
                tags,
                draft,
            } => {
                let created = self
                    .authoring()
                    .create(NewBlog {
                        title,
                        description,
                        image,
                        excerpt,
                        tags,
                        publish: !draft,
                    })
                    .await
                    .map_err(|err| notify(err, "Failed to create blog"))?;
                match created {
                    Some(blog) => println!("Blog created: {}", blog.id),
                    None => println!("Blog created"),
                }
            }
            Command::Edit {
                blog_id,
                title,
                description,
                image,
            } => {
                let blog_id = BlogId::from(blog_id);
                let existing = self
                    .api
                    .blog(&blog_id)
                    .await
                    .map_err(|err| notify(err, "Failed to load blog"))?;
                let mut edit = BlogEdit::from_blog(&existing);
                if let Some(title) = title {
                    edit.title = title;
                }
                if let Some(description) = description {
                    edit.description = description;
                }
                if let Some(image) = image {
                    edit.image = image;
                }
                self.authoring()
                    .update(&blog_id, edit)
                    .await
                    .map_err(|err| notify(err, "Failed to update blog"))?;
                println!("Blog updated successfully");
            }
            Command::Delete { blog_id } => {
                self.authoring()
                    .delete(&BlogId::from(blog_id))
                    .await
                    .map_err(|err| notify(err, "Failed to delete blog"))?;
                println!("Blog deleted successfully");
            }
            Command::Share { blog_id } => {
                let blog = self
                    .api
                    .blog(&BlogId::from(blog_id))
                    .await
                    .map_err(|err| notify(err, "Failed to load blog"))?;
                let links = share_links(&self.site_url, &blog)
                    .map_err(|err| notify(err, "Failed to build share links"))?;
                render::share(&blog, &links);
            }
            Command::Profile { user_id } => {
                let current_user = self.current_user().await?;
                let user_id = match user_id.map(UserId::from).or_else(|| current_user.clone()) {
                    Some(user_id) => user_id,
                    None => return Err(notify(ClientError::Unauthenticated, "")),
                };
                let page = Profiles::new(Arc::clone(&self.api), self.session.clone())
                    .page(&user_id)
                    .await
                    .map_err(|err| notify(err, "Failed to load profile"))?;
                render::profile(&page, current_user.as_ref());
            }
            Command::UpdateProfile {
                full_name,
                bio,
                location,
                website,
                gender,
                occupation,
                avatar_url,
            } => {
                let profile = Profiles::new(Arc::clone(&self.api), self.session.clone())
                    .update_own(UpdateProfileRequest {
                        full_name,
                        bio,
                        location,
                        website,
                        gender,
                        occupation,
                        avatar_url,
                    })
                    .await
                    .map_err(|err| notify(err, "Failed to update profile"))?;
                println!("Profile updated: {}", profile.display_name());
            }
            Command::Dashboard => {
                let data = self
                    .dashboard()
                    .load()
                    .await
                    .map_err(|err| notify(err, "Failed to load dashboard"))?;
                render::dashboard(&data);
            }
            Command::Drafts { action } => self.drafts(action).await?,
        }
        Ok(())
    }

    async fn drafts(&self, action: DraftCommand) -> Result<()> {
        let dashboard = self.dashboard();
        match action {
            DraftCommand::List => {
                let drafts = dashboard
                    .list_drafts()
                    .await
                    .map_err(|err| notify(err, "Failed to load drafts"))?;
                render::drafts(&drafts);
            }
            DraftCommand::Save { title, description } => {
                match dashboard
                    .save_draft(&title, &description)
                    .await
                    .map_err(|err| notify(err, "Failed to save draft"))?
                {
                    Some(draft) => println!("Draft saved: {}", draft.id),
                    None => println!("Nothing to save: title and content are required"),
                }
            }
            DraftCommand::Resume { id } => {
                match dashboard
                    .resume_draft(&id)
                    .await
                    .map_err(|err| notify(err, "Failed to load draft"))?
                {
                    Some(draft) => {
                        println!("title: {}", draft.title);
                        println!();
                        println!("{}", draft.description);
                    }
                    None => return Err(anyhow!("Draft {id} not found")),
                }
            }
            DraftCommand::Delete { id } => {
                let remaining = dashboard
                    .delete_draft(&id)
                    .await
                    .map_err(|err| notify(err, "Failed to delete draft"))?;
                println!("Draft deleted ({} left)", remaining.len());
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    debug!(
        "cli: settings api={} database={} page_size={}",
        settings.api_base_url, settings.database_url, settings.page_size
    );

    let storage = Storage::new(&settings.database_url).await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(storage);
    let api: Arc<dyn BlogApi> = Arc::new(HttpBlogApi::with_timeout(
        &settings.api_base_url,
        settings.request_timeout(),
    )?);

    let app = App {
        session: Session::new(Arc::clone(&api), IdentityStore::new(Arc::clone(&store))),
        views: Arc::new(ViewTracker::persistent(
            settings.view_dedup_window(),
            Arc::clone(&store),
        )),
        api,
        store,
        page_size: settings.page_size,
        site_url: settings.site_url,
    };
    app.run(cli.command).await
}
