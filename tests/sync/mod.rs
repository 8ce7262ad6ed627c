//! Gallery clients mirroring each other through a live relay

use std::time::Duration;

use tokio::sync::mpsc;

use shared_gallery::relay::{Inbound, RelayChannel, RelayMessage, RelaySink};
use shared_gallery::store::{MemoryStore, PhotoStore, PHOTOS_KEY};
use shared_gallery::view::RecordingRenderer;
use shared_gallery::{Gallery, GalleryApp, ImageProbe, InputEvent, InputLayer, Photo, ViewKind};

use crate::common::{TestRelay, ARRIVAL, SILENCE};

type Client = Gallery<MemoryStore, RelayChannel>;

async fn client(relay: &TestRelay) -> (Client, Inbound, MemoryStore) {
    let (channel, inbound) = RelayChannel::connect_now(&relay.ws_url())
        .await
        .expect("Failed to connect to relay");
    let backend = MemoryStore::new();
    let gallery = Gallery::open(PhotoStore::new(backend.clone()), channel);
    (gallery, inbound, backend)
}

async fn next_message(inbound: &mut Inbound) -> RelayMessage {
    tokio::time::timeout(ARRIVAL, inbound.recv())
        .await
        .expect("Timed out waiting for relay message")
        .expect("Relay inbound closed")
}

async fn assert_quiet(inbound: &mut Inbound) {
    if let Ok(Some(message)) = tokio::time::timeout(SILENCE, inbound.recv()).await {
        panic!("Unexpected relay message: {:?}", message);
    }
}

/// Deliver the next inbound message to `gallery`
async fn mirror(gallery: &mut Client, inbound: &mut Inbound) -> RelayMessage {
    let message = next_message(inbound).await;
    gallery
        .apply_remote(message.clone())
        .expect("Failed to apply remote change");
    message
}

#[tokio::test]
async fn test_add_reaches_peer_and_is_persisted_there() {
    let relay = TestRelay::start().await;
    let (mut a, mut a_in, _) = client(&relay).await;
    let (mut b, mut b_in, b_store) = client(&relay).await;

    let photo = a.commit_photo("https://example.com/a.png").unwrap();

    let message = mirror(&mut b, &mut b_in).await;
    assert_eq!(message.kind(), "added");
    assert_eq!(b.active().len(), 1);
    assert_eq!(b.active()[0].id, photo.id);
    assert_eq!(b.active()[0].date, photo.date);
    assert!(b_store.raw(PHOTOS_KEY).unwrap().contains(&photo.id.to_string()));

    // Applying a remote change is never echoed back
    assert_quiet(&mut a_in).await;
    assert_quiet(&mut b_in).await;
}

#[tokio::test]
async fn test_reorder_and_delete_converge() {
    let relay = TestRelay::start().await;
    let (mut a, _a_in, _) = client(&relay).await;
    let (mut b, mut b_in, _) = client(&relay).await;

    let first = a.commit_photo("https://example.com/1.png").unwrap();
    let second = a.commit_photo("https://example.com/2.png").unwrap();
    mirror(&mut b, &mut b_in).await;
    mirror(&mut b, &mut b_in).await;

    a.reorder(&[second.id, first.id]).unwrap();
    assert_eq!(mirror(&mut b, &mut b_in).await.kind(), "order-changed");
    assert_eq!(b.active(), a.active());

    a.delete(ViewKind::Gallery, 0).unwrap();
    assert_eq!(mirror(&mut b, &mut b_in).await.kind(), "deleted");
    assert_eq!(b.active(), a.active());
    assert_eq!(b.deleted(), a.deleted());
    assert_eq!(b.deleted()[0].id, second.id);

    a.delete(ViewKind::Deleted, 0).unwrap();
    mirror(&mut b, &mut b_in).await;
    assert!(b.deleted().is_empty());
}

#[tokio::test]
async fn test_duplicate_urls_delete_the_right_record() {
    let relay = TestRelay::start().await;
    let (mut a, _a_in, _) = client(&relay).await;
    let (mut b, mut b_in, _) = client(&relay).await;

    let url = "https://example.com/same.png";
    a.commit_photo(url).unwrap();
    let second = a.commit_photo(url).unwrap();
    mirror(&mut b, &mut b_in).await;
    mirror(&mut b, &mut b_in).await;

    a.delete(ViewKind::Gallery, 1).unwrap();
    mirror(&mut b, &mut b_in).await;

    assert_eq!(b.deleted()[0].id, second.id);
    assert_eq!(b.active(), a.active());
}

#[tokio::test]
async fn test_peers_propagate_in_both_directions() {
    let relay = TestRelay::start().await;
    let (mut a, mut a_in, _) = client(&relay).await;
    let (mut b, mut b_in, _) = client(&relay).await;
    let (mut c, mut c_in, _) = client(&relay).await;

    b.commit_photo("https://example.com/from-b.png").unwrap();
    mirror(&mut a, &mut a_in).await;
    mirror(&mut c, &mut c_in).await;

    assert_eq!(a.active(), b.active());
    assert_eq!(c.active(), b.active());
}

#[tokio::test]
async fn test_offline_client_keeps_working_locally() {
    // Nothing listens on port 1
    let (channel, mut inbound) = RelayChannel::connect("ws://127.0.0.1:1/ws");
    let backend = MemoryStore::new();
    let mut gallery = Gallery::open(PhotoStore::new(backend.clone()), channel.clone());

    gallery.commit_photo("https://example.com/a.png").unwrap();
    gallery.delete(ViewKind::Gallery, 0).unwrap();

    assert_eq!(gallery.deleted().len(), 1);
    assert!(backend.raw(PHOTOS_KEY).is_some());
    let closed = tokio::time::timeout(ARRIVAL, inbound.recv()).await.unwrap();
    assert!(closed.is_none());
    assert!(!channel.is_connected());
}

#[tokio::test]
async fn test_emits_before_handshake_are_dropped() {
    let relay = TestRelay::start().await;
    let (_peer, mut peer_in, _) = client(&relay).await;

    let (channel, _inbound) = RelayChannel::connect(&relay.ws_url());
    channel.emit(&RelayMessage::Added(Photo::new("https://example.com/early.png")));

    let deadline = tokio::time::Instant::now() + ARRIVAL;
    while !channel.is_connected() {
        assert!(tokio::time::Instant::now() < deadline, "Relay never connected");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    channel.emit(&RelayMessage::Added(Photo::new("https://example.com/late.png")));

    match next_message(&mut peer_in).await {
        RelayMessage::Added(photo) => assert_eq!(photo.url, "https://example.com/late.png"),
        other => panic!("Unexpected relay message: {:?}", other),
    }
    assert_quiet(&mut peer_in).await;
    channel.shutdown().await;
}

#[tokio::test]
async fn test_app_adds_probed_url_and_peer_mirrors_it() {
    let relay = TestRelay::start().await;
    let (channel, inbound) = RelayChannel::connect_now(&relay.ws_url()).await.unwrap();
    let (mut peer, mut peer_in, _) = client(&relay).await;

    let gallery = Gallery::open(PhotoStore::new(MemoryStore::new()), channel.clone());
    let mut app = GalleryApp::new(
        gallery,
        InputLayer::default(),
        RecordingRenderer::default(),
        ImageProbe::new(Duration::from_secs(5)).unwrap(),
        std::env::temp_dir(),
    );

    let (tx, rx) = mpsc::channel(8);
    tx.send(InputEvent::UrlSubmitted(relay.http_url("/img/dot.gif")))
        .await
        .unwrap();
    tx.send(InputEvent::UrlSubmitted(relay.http_url("/img/missing.gif")))
        .await
        .unwrap();
    drop(tx);

    let app = tokio::spawn(async move {
        app.run(rx, inbound).await;
        app
    })
    .await
    .unwrap();
    channel.shutdown().await;

    assert_eq!(app.gallery().active().len(), 1);
    assert_eq!(app.renderer().alerts.len(), 1);
    assert!(app.renderer().alerts[0].starts_with("Invalid image URL"));

    mirror(&mut peer, &mut peer_in).await;
    assert_eq!(peer.active(), app.gallery().active());
    assert_quiet(&mut peer_in).await;
}
