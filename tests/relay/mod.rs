//! Relay server behavior seen from raw WebSocket clients

use crate::common::{recv_text, send_text, ws_client, TestRelay, ARRIVAL, DOT_GIF, SILENCE};

const ADDED: &str = r#"{"type":"added","payload":{"url":"https://example.com/a.png","date":"2024-01-01T00:00:00.000Z"}}"#;
const DELETED: &str = r#"{"type":"deleted","payload":{"url":"https://example.com/a.png","fromGallery":true}}"#;

#[tokio::test]
async fn test_broadcast_reaches_everyone_but_the_sender() {
    let relay = TestRelay::start().await;
    let mut a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;
    let mut c = ws_client(&relay.ws_url()).await;

    send_text(&mut a, ADDED).await;

    assert_eq!(recv_text(&mut b, ARRIVAL).await.as_deref(), Some(ADDED));
    assert_eq!(recv_text(&mut c, ARRIVAL).await.as_deref(), Some(ADDED));
    assert_eq!(recv_text(&mut a, SILENCE).await, None);
}

#[tokio::test]
async fn test_frames_are_forwarded_verbatim() {
    let relay = TestRelay::start().await;
    let mut a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;

    // Key order and whitespace survive untouched
    let frame = r#"{ "payload": [], "type": "order-changed" }"#;
    send_text(&mut a, frame).await;

    assert_eq!(recv_text(&mut b, ARRIVAL).await.as_deref(), Some(frame));
}

#[tokio::test]
async fn test_invalid_frames_are_dropped() {
    let relay = TestRelay::start().await;
    let mut a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;

    send_text(&mut a, "not json at all").await;
    send_text(&mut a, r#"{"type":"renamed","payload":{}}"#).await;
    send_text(&mut a, r#"{"type":"added","payload":"missing fields"}"#).await;
    send_text(&mut a, DELETED).await;

    // The first frame b sees is the only valid one
    assert_eq!(recv_text(&mut b, ARRIVAL).await.as_deref(), Some(DELETED));
    assert_eq!(recv_text(&mut b, SILENCE).await, None);
}

#[tokio::test]
async fn test_frames_from_one_client_keep_their_order() {
    let relay = TestRelay::start().await;
    let mut a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;

    send_text(&mut a, ADDED).await;
    send_text(&mut a, DELETED).await;

    assert_eq!(recv_text(&mut b, ARRIVAL).await.as_deref(), Some(ADDED));
    assert_eq!(recv_text(&mut b, ARRIVAL).await.as_deref(), Some(DELETED));
}

#[tokio::test]
async fn test_disconnecting_client_does_not_disturb_others() {
    let relay = TestRelay::start().await;
    let a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;
    let mut c = ws_client(&relay.ws_url()).await;

    drop(a);
    send_text(&mut b, ADDED).await;

    assert_eq!(recv_text(&mut c, ARRIVAL).await.as_deref(), Some(ADDED));
}

#[tokio::test]
async fn test_late_joiner_gets_no_history() {
    let relay = TestRelay::start().await;
    let mut a = ws_client(&relay.ws_url()).await;
    let mut b = ws_client(&relay.ws_url()).await;

    send_text(&mut a, ADDED).await;
    assert!(recv_text(&mut b, ARRIVAL).await.is_some());

    let mut late = ws_client(&relay.ws_url()).await;
    assert_eq!(recv_text(&mut late, SILENCE).await, None);
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let relay = TestRelay::start().await;
    let client = reqwest::Client::new();

    let index = client.get(relay.http_url("/")).send().await.unwrap();
    assert_eq!(index.status(), reqwest::StatusCode::OK);
    assert!(index.text().await.unwrap().contains("<title>gallery</title>"));

    let gif = client.get(relay.http_url("/img/dot.gif")).send().await.unwrap();
    assert_eq!(gif.status(), reqwest::StatusCode::OK);
    assert_eq!(
        gif.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/gif")
    );
    assert_eq!(gif.bytes().await.unwrap().as_ref(), DOT_GIF);
}

#[tokio::test]
async fn test_missing_assets_and_other_methods_are_refused() {
    let relay = TestRelay::start().await;
    let client = reqwest::Client::new();

    let missing = client.get(relay.http_url("/img/nope.png")).send().await.unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let post = client.post(relay.http_url("/index.html")).send().await.unwrap();
    assert_eq!(post.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}
