//! Client core of the blogging app: the explore feed, per-blog engagement
//! state, session handling and the authoring/dashboard flows, all talking to
//! the backend through [`BlogApi`].

pub mod api;
pub mod authoring;
pub mod config;
pub mod dashboard;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod lifetime;
pub mod profile;
pub mod session;
pub mod share;
pub mod validation;

pub use api::{BlogApi, HttpBlogApi};
pub use authoring::{BlogAuthoring, BlogEdit, NewBlog};
pub use config::{load_settings, Settings};
pub use dashboard::{Dashboard, DashboardData};
pub use engagement::{BlogEngagement, EngagementSnapshot, ViewRecord, ViewTracker};
pub use error::{ClientError, ClientResult};
pub use feed::{Feed, FeedAssembler, FeedPage, FeedView};
pub use lifetime::ViewLifetime;
pub use profile::{ProfilePage, Profiles};
pub use session::Session;
pub use share::{share_links, ShareLinks};
pub use validation::ValidationErrors;

#[cfg(test)]
#[path = "tests/fake_api.rs"]
mod fake_api;
