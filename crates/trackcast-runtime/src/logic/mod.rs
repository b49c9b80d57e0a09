//! Publisher Logic Module
//!
//! The publisher session split into focused components:
//! - `state`: session state, lifecycle and statistics
//! - `handlers`: command, event and outcome handlers
//! - `task`: the `PublisherTask` loop
//!
//! ## Single Writer
//!
//! All session state is owned by one `PublisherTask`. Public calls, collaborator
//! events and the results of collaborator calls all arrive as `Message`s on a
//! single queue and are applied strictly in arrival order, one at a time. A
//! handler never waits on the network: it returns effects, and any result comes
//! back later as another message. Because nothing else can touch the state, no
//! locking is needed anywhere in the session.

pub mod handlers;
pub mod state;
pub mod task;

pub use handlers::{Reaction, SessionHandlers};
pub use state::{EarlySignal, ProximityRegistration, PublisherState, PublisherStats, SessionState};
pub use task::PublisherTask;
