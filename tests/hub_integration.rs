//! Hub integration tests.
//!
//! These drive sessions through the hub directly, reading frames from the
//! in-memory outboxes instead of real sockets.

use std::time::Duration;

use chat_hub::{Envelope, EnvelopeKind, Frame, Hub, HubConfig, SessionId, SessionLifecycle};
use serde_json::json;
use tokio::sync::mpsc::Receiver;

const TIMEOUT: Duration = Duration::from_secs(5);

fn fast_hub() -> Hub {
    Hub::new(HubConfig {
        latency: Duration::from_millis(10),
        ..HubConfig::default()
    })
}

/// Wait for all delayed sends, then collect everything queued for `rx`.
async fn settle(hub: &Hub, rx: &mut Receiver<Frame>) -> Vec<Envelope> {
    assert!(hub.drain(TIMEOUT).await, "delayed sends did not drain");
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        out.push(Envelope::from_frame(&frame).unwrap());
    }
    out
}

fn about<'a>(envelopes: &'a [Envelope], id: &SessionId, kind: EnvelopeKind) -> Vec<&'a Envelope> {
    envelopes
        .iter()
        .filter(|e| e.kind() == kind && e.is_about(id))
        .collect()
}

// ============================================================================
// Three-session scenario
// ============================================================================

#[tokio::test]
async fn test_three_session_scenario() {
    let hub = fast_hub();

    // S1 alone gets only its own Welcome.
    let (mut s1, mut rx1) = hub.connect().unwrap();
    let seen1 = settle(&hub, &mut rx1).await;
    assert_eq!(seen1.len(), 1);
    assert_eq!(seen1[0].kind(), EnvelopeKind::Welcome);
    assert!(seen1[0].is_about(&s1.id()));

    // S2 and S3 connect back to back, before any greeting fires.
    let (s2, mut rx2) = hub.connect().unwrap();
    let (s3, mut rx3) = hub.connect().unwrap();
    let seen1 = settle(&hub, &mut rx1).await;
    let seen2 = settle(&hub, &mut rx2).await;
    let seen3 = settle(&hub, &mut rx3).await;

    assert_eq!(about(&seen1, &s2.id(), EnvelopeKind::Joined).len(), 1);
    assert_eq!(about(&seen3, &s2.id(), EnvelopeKind::Joined).len(), 1);
    assert!(about(&seen2, &s2.id(), EnvelopeKind::Joined).is_empty());
    assert_eq!(about(&seen2, &s2.id(), EnvelopeKind::Welcome).len(), 1);
    assert_eq!(about(&seen3, &s3.id(), EnvelopeKind::Welcome).len(), 1);

    // S2 talks: S1 and S3 hear it, S2 does not.
    s2.receive(br#"{"text":"hi"}"#).unwrap();
    let seen1 = settle(&hub, &mut rx1).await;
    let seen2 = settle(&hub, &mut rx2).await;
    let seen3 = settle(&hub, &mut rx3).await;

    for seen in [&seen1, &seen3] {
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            Envelope::Message {
                user_id: s2.id().to_string(),
                user_name: s2.display_name().to_string(),
                message: json!({"text": "hi"}),
            }
        );
    }
    assert!(seen2.is_empty());

    // S1 leaves: S2 and S3 each hear exactly one Left.
    assert!(s1.close());
    let seen2 = settle(&hub, &mut rx2).await;
    let seen3 = settle(&hub, &mut rx3).await;
    assert_eq!(about(&seen2, &s1.id(), EnvelopeKind::Left).len(), 1);
    assert_eq!(about(&seen3, &s1.id(), EnvelopeKind::Left).len(), 1);

    let live: Vec<_> = hub
        .registry()
        .snapshot(None)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(live, vec![s2.id(), s3.id()]);
}

// ============================================================================
// Ordering and teardown
// ============================================================================

#[tokio::test]
async fn test_welcome_precedes_news_about_session() {
    let hub = fast_hub();
    let (_observer, mut rx_observer) = hub.connect().unwrap();
    let (outbox, mut rx_new) = chat_hub::Outbox::channel(32);
    let mut newcomer = SessionLifecycle::accept(&hub, outbox).unwrap();

    // Message and Left are issued before the greeting can have fired.
    newcomer.receive(b"\"hello\"").unwrap();
    newcomer.close();

    let seen_new = settle(&hub, &mut rx_new).await;
    let seen_observer = settle(&hub, &mut rx_observer).await;

    assert_eq!(seen_new.first().map(Envelope::kind), Some(EnvelopeKind::Welcome));
    let kinds: Vec<_> = seen_observer
        .iter()
        .filter(|e| e.is_about(&newcomer.id()))
        .map(Envelope::kind)
        .collect();
    assert_eq!(kinds[0], EnvelopeKind::Joined);
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&EnvelopeKind::Message));
    assert!(kinds.contains(&EnvelopeKind::Left));
}

#[tokio::test]
async fn test_double_close_broadcasts_one_left() {
    let hub = fast_hub();
    let (mut leaving, _rx) = hub.connect().unwrap();
    let (_staying, mut rx_staying) = hub.connect().unwrap();
    settle(&hub, &mut rx_staying).await;

    assert!(leaving.close());
    assert!(!leaving.close());

    let seen = settle(&hub, &mut rx_staying).await;
    assert_eq!(about(&seen, &leaving.id(), EnvelopeKind::Left).len(), 1);
    assert!(!hub.registry().contains(&leaving.id()).unwrap());
}

#[tokio::test]
async fn test_malformed_payload_is_dropped() {
    let hub = fast_hub();
    let (sender, mut rx_sender) = hub.connect().unwrap();
    let (_peer, mut rx_peer) = hub.connect().unwrap();
    settle(&hub, &mut rx_sender).await;
    settle(&hub, &mut rx_peer).await;

    assert!(sender.receive(b"{\"unterminated\": ").is_err());
    assert!(sender.receive(b"").is_err());

    assert!(settle(&hub, &mut rx_peer).await.is_empty());
    assert!(hub.registry().contains(&sender.id()).unwrap());

    // The session keeps working afterwards.
    sender.receive(b"42").unwrap();
    let seen = settle(&hub, &mut rx_peer).await;
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], Envelope::Message { message, .. } if *message == json!(42)));
}

#[tokio::test]
async fn test_dead_peer_does_not_block_broadcast() {
    let hub = fast_hub();
    let (sender, mut rx_sender) = hub.connect().unwrap();
    let (_dead, rx_dead) = hub.connect().unwrap();
    let (_alive, mut rx_alive) = hub.connect().unwrap();
    settle(&hub, &mut rx_sender).await;
    settle(&hub, &mut rx_alive).await;
    drop(rx_dead);

    sender.receive(br#"{"text":"anyone?"}"#).unwrap();

    let seen = settle(&hub, &mut rx_alive).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind(), EnvelopeKind::Message);
}

#[tokio::test]
async fn test_many_concurrent_sessions_have_unique_ids() {
    let hub = fast_hub();
    let mut tasks = Vec::new();
    for _ in 0..50 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            let (session, rx) = hub.connect().unwrap();
            (session, rx)
        }));
    }

    let mut sessions = Vec::new();
    for task in tasks {
        sessions.push(task.await.unwrap());
    }

    let ids: std::collections::HashSet<_> = sessions.iter().map(|(s, _)| s.id()).collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(hub.registry().count(), 50);

    for (session, _) in sessions.iter_mut() {
        session.close();
    }
    assert!(hub.drain(TIMEOUT).await);
    assert_eq!(hub.registry().count(), 0);
}
