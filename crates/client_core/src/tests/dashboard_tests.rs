use shared::domain::{Comment, UserId};
use storage::{IdentityStore, MemoryStore};

use super::*;
use crate::fake_api::{authored, blog, profile, FakeApi};

async fn dashboard_for(api: &Arc<FakeApi>, user_id: Option<&str>) -> Dashboard {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let identity = IdentityStore::new(Arc::clone(&store));
    if let Some(user_id) = user_id {
        identity
            .save(&Identity {
                user_id: UserId::from(user_id),
                user_name: "alice".into(),
                user_email: "alice@example.com".into(),
            })
            .await
            .expect("save identity");
    }
    Dashboard::new(api.clone(), Session::new(api.clone(), identity), store)
}

fn api_with_blogs() -> Arc<FakeApi> {
    let mut commented = authored(blog("b1", "One", 7), "u1", "alice");
    commented.comments.push(Comment {
        user: None,
        text: "hi".into(),
        created_at: None,
    });
    let api = FakeApi::with_blogs(vec![
        commented,
        authored(blog("b2", "Two", 3), "u1", "alice"),
        authored(blog("b3", "Three", 50), "u2", "bob"),
    ]);
    api.add_user(profile("u1", "alice"));
    api
}

#[tokio::test]
async fn totals_come_from_stats_endpoint() {
    let api = api_with_blogs();
    let stats = EngagementTotals {
        total_views: 1000,
        total_likes: 20,
        total_comments: 3,
    };
    api.set_stats(stats);
    let dashboard = dashboard_for(&api, Some("u1")).await;

    let data = dashboard.load().await.expect("load");
    assert_eq!(data.identity.user_id, UserId::from("u1"));
    assert_eq!(data.total_posts(), 2);
    assert_eq!(data.totals, stats);
    assert!(data.drafts.is_empty());
}

#[tokio::test]
async fn totals_fall_back_to_local_sums() {
    let api = api_with_blogs();
    api.fail("user_stats");
    let dashboard = dashboard_for(&api, Some("u1")).await;

    let data = dashboard.load().await.expect("load");
    assert_eq!(
        data.totals,
        EngagementTotals {
            total_views: 10,
            total_likes: 0,
            total_comments: 1
        }
    );
    assert_eq!(api.call_count("user_stats"), 1);
}

#[tokio::test]
async fn load_requires_a_signed_in_user() {
    let api = api_with_blogs();
    let dashboard = dashboard_for(&api, None).await;

    assert!(matches!(
        dashboard.load().await,
        Err(ClientError::Unauthenticated)
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn drafts_save_list_resume_and_delete() {
    let api = api_with_blogs();
    let dashboard = dashboard_for(&api, Some("u1")).await;

    assert_eq!(dashboard.save_draft("  ", "body").await.expect("blank"), None);

    let first = dashboard
        .save_draft(" First idea ", "Some notes")
        .await
        .expect("save")
        .expect("draft");
    assert_eq!(first.title, "First idea");
    let second = dashboard
        .save_draft("Second idea", "More notes")
        .await
        .expect("save")
        .expect("draft");

    let listed: Vec<String> = dashboard
        .list_drafts()
        .await
        .expect("list")
        .into_iter()
        .map(|draft| draft.title)
        .collect();
    assert_eq!(listed, vec!["Second idea", "First idea"]);

    let resumed = dashboard
        .resume_draft(&first.id)
        .await
        .expect("resume")
        .expect("present");
    assert_eq!(resumed.description, "Some notes");

    let remaining = dashboard.delete_draft(&second.id).await.expect("delete");
    assert_eq!(remaining, vec![first]);
    assert!(dashboard
        .resume_draft(&second.id)
        .await
        .expect("resume")
        .is_none());

    let data = dashboard.load().await.expect("load");
    assert_eq!(data.drafts.len(), 1);
}

#[tokio::test]
async fn guest_drafts_are_kept_apart_from_user_drafts() {
    let api = api_with_blogs();
    let guest = dashboard_for(&api, None).await;
    guest
        .save_draft("Guest idea", "notes")
        .await
        .expect("save")
        .expect("draft");

    let titles: Vec<String> = guest
        .list_drafts()
        .await
        .expect("list")
        .into_iter()
        .map(|draft| draft.title)
        .collect();
    assert_eq!(titles, vec!["Guest idea"]);

    let user = dashboard_for(&api, Some("u1")).await;
    assert!(user.list_drafts().await.expect("list").is_empty());
}

#[tokio::test]
async fn drafts_stay_visible_when_blogs_cannot_be_fetched() {
    let api = api_with_blogs();
    api.fail("user_blogs");
    api.fail("user_stats");
    let dashboard = dashboard_for(&api, Some("u1")).await;
    dashboard
        .save_draft("Offline idea", "written on a train")
        .await
        .expect("save")
        .expect("draft");

    let data = dashboard.load().await.expect("load");
    assert!(data.blogs.is_empty());
    assert_eq!(data.totals, EngagementTotals::default());
    assert_eq!(data.drafts.len(), 1);
    assert_eq!(data.drafts[0].title, "Offline idea");
}
