//! Real-time Update Module
//!
//! Pushes `ChatEvent`s to connected clients over WebSockets.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── registry.rs     - User → live connection map
//! ├── broadcast.rs    - Audience resolution and fan-out
//! ├── session.rs      - Per-connection lifecycle and inbound frames
//! └── subscription.rs - GET /ws upgrade and socket loop
//! ```
//!
//! # Delivery Model
//!
//! Each user has at most one registered connection. After a durable change
//! commits, its handler asks the `Notifier` to deliver one event to an
//! audience: the participants of a conversation or the current members of a
//! group. The audience is read from the store at delivery time. Users who
//! are offline miss the event; nothing is queued or replayed.
//!
//! # Example
//!
//! ```rust,ignore
//! use texting::backend::realtime::Audience;
//! use texting::shared::ChatEvent;
//!
//! app_state.notifier.announce(
//!     Audience::Group(group_id),
//!     ChatEvent::GroupUpdated { group_id },
//! );
//! ```

/// Connection registry
pub mod registry;

/// Audience fan-out
pub mod broadcast;

/// Client session state machine
pub mod session;

/// WebSocket subscription handler
pub mod subscription;

pub use broadcast::{Audience, Notifier};
pub use registry::{ConnectionClosed, ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use session::{FrameOutcome, Session, SessionState};
pub use subscription::handle_ws_upgrade;
