use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use estate::{
    app::build_app,
    client::{
        storage::StorageClient, ApiClient, ClientError, ImageFile, ImageUploader, ListingForm,
        SessionState,
    },
    state::AppState,
};
use tokio::net::TcpListener;

struct NullStorage;

#[async_trait]
impl StorageClient for NullStorage {
    async fn put_object(&self, _key: &str, _body: Bytes, _ct: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{key}")
    }
}

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(AppState::in_memory());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn jpeg(name: &str) -> ImageFile {
    ImageFile::new(name, "image/jpeg", vec![1u8; 64])
}

#[tokio::test]
async fn owner_creates_and_updates_listing_through_client() {
    let base = spawn_server().await;
    let api = ApiClient::new(&base).unwrap();
    let uploader = ImageUploader::new(Arc::new(NullStorage));

    let ack = api.signup("fay", "fay@example.com", "pw-123456").await.unwrap();
    assert_eq!(ack, "User created successfully!");

    let mut session = SessionState::default();
    let err = session.sign_in(&api, "fay@example.com", "nope").await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(session.error.as_deref(), Some("Wrong credentials!"));

    session.sign_in(&api, "fay@example.com", "pw-123456").await.unwrap();
    let me = session.current_user.clone().unwrap();
    assert_eq!(me.username, "fay");

    let mut form = ListingForm {
        name: "Garden flat near the river".into(),
        description: "Two rooms and a garden".into(),
        address: "5 River Walk".into(),
        regular_price: 900,
        discount_price: 950,
        offer: true,
        ..ListingForm::default()
    };

    // no images yet
    assert!(matches!(form.submit_create(&api).await, Err(ClientError::Validation(_))));

    form.attach_images(&uploader, vec![jpeg("front.jpg"), jpeg("garden.jpg")])
        .await
        .unwrap();
    assert_eq!(form.image_urls.len(), 2);

    // discount above regular price never reaches the server
    let err = form.submit_create(&api).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(api.user_listings(me.id).await.unwrap().len(), 0);

    form.discount_price = 850;
    let created = form.submit_create(&api).await.unwrap();
    assert_eq!(created.user_ref, me.id);
    assert_eq!(created.image_urls, form.image_urls);

    let mut edit = ListingForm::from_listing(&api.get_listing(created.id).await.unwrap());
    edit.furnished = true;
    edit.remove_image(0);
    let updated = edit.submit_update(&api, created.id).await.unwrap();
    assert!(updated.furnished);
    assert_eq!(updated.image_urls.len(), 1);

    session.sign_out_remote(&api).await.unwrap();
    assert!(session.current_user.is_none());
    let err = api.delete_listing(created.id).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn other_user_cannot_touch_listing() {
    let base = spawn_server().await;
    let owner = ApiClient::new(&base).unwrap();
    let intruder = ApiClient::new(&base).unwrap();

    let mut owner_session = SessionState::default();
    owner_session
        .sign_in_with_google(&owner, "Gus Owner", "gus@example.com", None)
        .await
        .unwrap();

    let mut form = ListingForm {
        name: "Penthouse with a view".into(),
        description: "Top floor".into(),
        address: "99 Tower Rd".into(),
        regular_price: 5000,
        image_urls: vec!["https://cdn.test/p.jpg".into()],
        ..ListingForm::default()
    };
    let listing = form.submit_create(&owner).await.unwrap();

    intruder.signup("hal", "hal@example.com", "pw-123456").await.unwrap();
    intruder.signin("hal@example.com", "pw-123456").await.unwrap();

    let err = intruder.delete_listing(listing.id).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    assert_eq!(err.to_string(), "You can only delete your own listings!");

    // readable by anyone
    let fetched = intruder.get_listing(listing.id).await.unwrap();
    assert_eq!(fetched.id, listing.id);

    assert_eq!(owner.delete_listing(listing.id).await.unwrap(), "Listing has been deleted!");
}
