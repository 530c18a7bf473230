use std::sync::Arc;

use chrono::Utc;
use shared::domain::{Identity, UserId};
use storage::{DraftStore, IdentityStore, KeyValueStore, Storage};

#[tokio::test]
async fn drafts_and_identity_survive_reopening_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = format!(
        "sqlite://{}",
        dir.path().join("client.db").to_string_lossy().replace('\\', "/")
    );
    let user = UserId::from("u-42");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(Storage::new(&database_url).await.expect("db"));
        IdentityStore::new(Arc::clone(&store))
            .save(&Identity {
                user_id: user.clone(),
                user_name: "writer".into(),
                user_email: "writer@example.com".into(),
            })
            .await
            .expect("identity");
        DraftStore::for_user(store, Some(&user))
            .save("Outline", "intro, body, outro", Utc::now())
            .await
            .expect("save")
            .expect("draft");
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(Storage::new(&database_url).await.expect("reopen"));
    let identity = IdentityStore::new(Arc::clone(&store))
        .load()
        .await
        .expect("load")
        .expect("identity");
    assert_eq!(identity.user_id, user);

    let drafts = DraftStore::for_user(store, Some(&user))
        .list()
        .await
        .expect("drafts");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Outline");
}
