//! Audience fan-out integration tests
//!
//! Registers channel-backed connections directly and checks which users
//! receive each event.

#[path = "../../common/mod.rs"]
mod common;

use common::{listen, TestApp};
use pretty_assertions::assert_eq;
use serde_json::Value;
use texting::backend::realtime::Audience;
use texting::shared::ChatEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

fn received(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).expect("frame is JSON"));
    }
    frames
}

#[tokio::test]
async fn test_message_edit_reaches_both_participants() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let carol = app.user("carol");
    let conversation_id = app.conversation(&alice, &bob);

    let mut alice_rx = listen(&app.state, alice.id);
    let mut bob_rx = listen(&app.state, bob.id);
    let mut carol_rx = listen(&app.state, carol.id);

    let message_id = Uuid::new_v4();
    let event = ChatEvent::MessageEdited { conversation_id, message_id };
    let delivered = app
        .state
        .notifier
        .notify_audience(Audience::Conversation(conversation_id), &event)
        .await;

    assert_eq!(delivered, 2);
    for rx in [&mut alice_rx, &mut bob_rx] {
        let frames = received(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "message_edited");
        assert_eq!(frames[0]["message_id"], message_id.to_string());
    }
    assert!(received(&mut carol_rx).is_empty());
}

#[tokio::test]
async fn test_group_event_uses_current_membership() {
    let app = TestApp::new();
    let (a, b, c, d) = (app.user("a_user"), app.user("b_user"), app.user("c_user"), app.user("d_user"));
    let group_id = app.group(&[&a, &b, &c]);

    let mut rxs: Vec<_> = [&a, &b, &c, &d].iter().map(|u| listen(&app.state, u.id)).collect();

    let event = ChatEvent::NewGroupMessage { group_id };
    let delivered = app.state.notifier.notify_audience(Audience::Group(group_id), &event).await;
    assert_eq!(delivered, 3);

    let counts: Vec<usize> = rxs.iter_mut().map(|rx| received(rx).len()).collect();
    assert_eq!(counts, vec![1, 1, 1, 0]);
}

#[tokio::test]
async fn test_member_who_left_no_longer_receives() {
    let app = TestApp::new();
    let (a, b, c) = (app.user("a_user"), app.user("b_user"), app.user("c_user"));
    let group_id = app.group(&[&a, &b, &c]);
    let mut c_rx = listen(&app.state, c.id);
    let mut a_rx = listen(&app.state, a.id);

    app.store.remove_group_member(group_id, c.id);

    let event = ChatEvent::MemberLeft { group_id };
    let delivered = app.state.notifier.notify_audience(Audience::Group(group_id), &event).await;

    assert_eq!(delivered, 1);
    assert_eq!(received(&mut a_rx)[0]["type"], "member_left");
    assert!(received(&mut c_rx).is_empty());
}

#[tokio::test]
async fn test_offline_participant_is_skipped() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let conversation_id = app.conversation(&alice, &bob);
    let mut alice_rx = listen(&app.state, alice.id);

    let event = ChatEvent::ReloadMessages { conversation_id };
    let delivered = app
        .state
        .notifier
        .notify_audience(Audience::Conversation(conversation_id), &event)
        .await;

    assert_eq!(delivered, 1);
    assert_eq!(received(&mut alice_rx).len(), 1);
}

#[tokio::test]
async fn test_store_failure_delivers_nothing() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let conversation_id = app.conversation(&alice, &bob);
    let mut alice_rx = listen(&app.state, alice.id);
    let mut bob_rx = listen(&app.state, bob.id);

    app.store.set_failing(true);

    let event = ChatEvent::MessageDeleted { conversation_id, message_id: Uuid::new_v4() };
    let delivered = app
        .state
        .notifier
        .notify_audience(Audience::Conversation(conversation_id), &event)
        .await;

    assert_eq!(delivered, 0);
    assert!(received(&mut alice_rx).is_empty());
    assert!(received(&mut bob_rx).is_empty());
}

#[tokio::test]
async fn test_deleted_conversation_uses_captured_participants() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let conversation_id = app.conversation(&alice, &bob);
    let mut alice_rx = listen(&app.state, alice.id);
    let mut bob_rx = listen(&app.state, bob.id);

    app.store.remove_conversation(conversation_id);

    let event = ChatEvent::ConversationDeleted { conversation_id };
    let by_row = app
        .state
        .notifier
        .notify_audience(Audience::Conversation(conversation_id), &event)
        .await;
    assert_eq!(by_row, 0);

    let delivered = app
        .state
        .notifier
        .announce(Audience::Users(vec![alice.id, bob.id]), event)
        .await
        .expect("delivery task panicked");

    assert_eq!(delivered, 2);
    assert_eq!(received(&mut alice_rx)[0]["type"], "conversation_deleted");
    assert_eq!(received(&mut bob_rx)[0]["conversation_id"], conversation_id.to_string());
}

#[tokio::test]
async fn test_replaced_connection_gets_events_on_new_channel_only() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let conversation_id = app.conversation(&alice, &bob);

    let mut first = listen(&app.state, bob.id);
    let mut second = listen(&app.state, bob.id);

    let event = ChatEvent::ReloadMessages { conversation_id };
    app.state
        .notifier
        .notify_audience(Audience::Conversation(conversation_id), &event)
        .await;

    assert!(received(&mut first).is_empty());
    assert_eq!(received(&mut second).len(), 1);
}
