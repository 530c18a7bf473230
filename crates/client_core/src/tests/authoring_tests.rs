use shared::domain::Identity;
use storage::{IdentityStore, MemoryStore};

use super::*;
use crate::{
    error::ClientError,
    fake_api::{authored, blog, profile, FakeApi},
};

const IMAGE: &str = "https://cdn.example.com/cover.jpg";

async fn signed_in(api: &Arc<FakeApi>, user_id: Option<&str>) -> BlogAuthoring {
    let identity = IdentityStore::new(Arc::new(MemoryStore::new()));
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
    BlogAuthoring::new(api.clone(), Session::new(api.clone(), identity))
}

fn long_description() -> String {
    "Ownership and borrowing make data races a compile error. ".repeat(5)
}

fn new_blog() -> NewBlog {
    NewBlog {
        title: "Fearless Concurrency, Explained!".into(),
        description: long_description(),
        image: IMAGE.into(),
        excerpt: None,
        tags: vec![" rust ".into(), "".into(), "rust".into(), "async".into()],
        publish: true,
    }
}

#[test]
fn slugs_are_lowercase_and_dash_separated() {
    assert_eq!(slugify("Hello, World! Rust 2024"), "hello-world-rust-2024");
    assert_eq!(slugify("  --Already--Slugged--  "), "already-slugged");
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn reading_time_rounds_up() {
    assert_eq!(reading_time_minutes(""), 1);
    assert_eq!(reading_time_minutes("   "), 1);
    assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
    assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
}

#[test]
fn tags_are_trimmed_and_deduplicated() {
    assert_eq!(
        normalize_tags([" rust ", "", "rust", "async", "  "]),
        vec!["rust", "async"]
    );
}

#[test]
fn request_defaults_excerpt_from_description() {
    let request = new_blog()
        .into_request(UserId::from("u1"))
        .expect("valid");

    assert_eq!(request.slug, "fearless-concurrency-explained");
    assert_eq!(request.tags, vec!["rust", "async"]);
    assert_eq!(request.excerpt.chars().count(), MAX_EXCERPT_CHARS);
    assert!(long_description().starts_with(&request.excerpt));
    assert!(request.is_published);
    assert_eq!(request.user, UserId::from("u1"));

    let explicit = NewBlog {
        excerpt: Some("Short and sweet".into()),
        ..new_blog()
    }
    .into_request(UserId::from("u1"))
    .expect("valid");
    assert_eq!(explicit.excerpt, "Short and sweet");
}

#[test]
fn tag_count_is_checked_after_normalizing() {
    let blog = NewBlog {
        tags: vec!["  ".into(), "".into()],
        ..new_blog()
    };
    let err = blog.into_request(UserId::from("u1")).expect_err("no tags");
    let ClientError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.get("tags"), Some("Add at least one tag"));
}

#[tokio::test]
async fn create_sends_author_and_derived_fields() {
    let api = FakeApi::new();
    let authoring = signed_in(&api, Some("u1")).await;

    let created = authoring
        .create(new_blog())
        .await
        .expect("create")
        .expect("echoed blog");
    assert_eq!(created.author_id(), Some(&UserId::from("u1")));
    assert_eq!(created.slug.as_deref(), Some("fearless-concurrency-explained"));

    let sent = api.created();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user, UserId::from("u1"));
}

#[tokio::test]
async fn create_requires_a_signed_in_user() {
    let api = FakeApi::new();
    let authoring = signed_in(&api, None).await;

    assert!(matches!(
        authoring.create(new_blog()).await,
        Err(ClientError::Unauthenticated)
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn invalid_blog_is_not_sent() {
    let api = FakeApi::new();
    let authoring = signed_in(&api, Some("u1")).await;

    let err = authoring
        .create(NewBlog {
            description: "too short".into(),
            image: "https://example.com/report.pdf".into(),
            ..new_blog()
        })
        .await
        .expect_err("invalid");
    let ClientError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.get("image").is_some());
    assert!(api.created().is_empty());
}

#[tokio::test]
async fn update_validates_and_stamps_author() {
    let api = FakeApi::with_blogs(vec![authored(blog("b1", "Old title", 5), "u1", "alice")]);
    let authoring = signed_in(&api, Some("u1")).await;
    let existing = api.blog_snapshot("b1").expect("blog");

    let mut edit = BlogEdit::from_blog(&existing);
    edit.title = "New".into();
    let err = authoring
        .update(&existing.id, edit.clone())
        .await
        .expect_err("short title");
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(api.updated().is_empty());

    edit.title = "A better title".into();
    edit.description = "Now with a much longer body.".into();
    edit.image = IMAGE.into();
    let updated = authoring
        .update(&existing.id, edit)
        .await
        .expect("update")
        .expect("echoed blog");
    assert_eq!(updated.title, "A better title");

    let (blog_id, request) = api.updated().remove(0);
    assert_eq!(blog_id, existing.id);
    assert_eq!(request.user, UserId::from("u1"));
}

#[tokio::test]
async fn delete_and_list_own_blogs() {
    let api = FakeApi::with_blogs(vec![
        authored(blog("b1", "Mine", 5), "u1", "alice"),
        authored(blog("b2", "Also mine", 2), "u1", "alice"),
        authored(blog("b3", "Theirs", 9), "u2", "bob"),
    ]);
    api.add_user(profile("u1", "alice"));
    let authoring = signed_in(&api, Some("u1")).await;

    authoring.delete(&BlogId::from("b1")).await.expect("delete");
    let mine = authoring.my_blogs().await.expect("my blogs");
    assert_eq!(mine.profile.username, "alice");
    let ids: Vec<&str> = mine.blogs.iter().map(|blog| blog.id.as_str()).collect();
    assert_eq!(ids, vec!["b2"]);

    let err = authoring
        .delete(&BlogId::from("b1"))
        .await
        .expect_err("already gone");
    assert!(err.is_soft_failure());
}
