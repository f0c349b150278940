//! Property-based tests for the connection registry and fan-out

#[path = "../common/mod.rs"]
mod common;

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use texting::backend::realtime::{Audience, ConnectionHandle, ConnectionId, ConnectionRegistry};
use texting::shared::messaging::UserId;
use texting::shared::ChatEvent;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Connect(usize),
    Close(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Connect),
        (0..4usize, 0..8usize).prop_map(|(u, k)| Op::Close(u, k)),
    ]
}

proptest! {
    /// The registry always holds the most recent unclosed connection of each user
    #[test]
    fn test_latest_connection_wins(ops in prop::collection::vec(op(), 1..60)) {
        let registry = ConnectionRegistry::new();
        let users: Vec<UserId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut opened: HashMap<usize, Vec<ConnectionHandle>> = HashMap::new();
        let mut current: HashMap<usize, ConnectionId> = HashMap::new();

        for op in ops {
            match op {
                Op::Connect(u) => {
                    let (handle, _rx) = ConnectionHandle::new(users[u]);
                    current.insert(u, handle.id());
                    registry.register(handle.clone());
                    opened.entry(u).or_default().push(handle);
                }
                Op::Close(u, k) => {
                    let Some(handles) = opened.get(&u) else { continue };
                    let id = handles[k % handles.len()].id();
                    let removed = registry.unregister(users[u], id);
                    let was_current = current.get(&u) == Some(&id);
                    prop_assert_eq!(removed, was_current);
                    if was_current {
                        current.remove(&u);
                    }
                }
            }

            for (u, user_id) in users.iter().enumerate() {
                let live = registry.lookup(*user_id).map(|h| h.id());
                prop_assert_eq!(live, current.get(&u).copied());
            }
            prop_assert_eq!(registry.len(), current.len());
        }
    }

    /// A fixed audience reaches each connected user exactly once
    #[test]
    fn test_users_audience_delivers_once_per_user(
        picks in prop::collection::vec(0..6usize, 0..20),
        online in prop::collection::hash_set(0..6usize, 0..6),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let app = common::TestApp::new();
        let users: Vec<UserId> = (0..6).map(|_| Uuid::new_v4()).collect();
        let mut receivers = HashMap::new();
        for &u in &online {
            let (handle, rx) = ConnectionHandle::new(users[u]);
            app.registry().register(handle);
            receivers.insert(u, rx);
        }

        let audience = Audience::Users(picks.iter().map(|&u| users[u]).collect());
        let event = ChatEvent::GroupUpdated { group_id: Uuid::new_v4() };
        let delivered = runtime.block_on(app.state.notifier.notify_audience(audience, &event));

        let expected: HashSet<usize> = picks.iter().copied().filter(|u| online.contains(u)).collect();
        prop_assert_eq!(delivered, expected.len());

        for (u, rx) in receivers.iter_mut() {
            let mut count = 0;
            while rx.try_recv().is_ok() {
                count += 1;
            }
            prop_assert_eq!(count, usize::from(expected.contains(u)));
        }
    }
}
