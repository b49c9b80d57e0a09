//! trackcast Runtime
//!
//! The publisher session engine. A `PublisherBuilder` wires the collaborators to
//! one serialized `PublisherTask`, which owns all session state, and hands back
//! a cloneable `Publisher` handle. Results and delegate notifications are
//! delivered by a separate foreground dispatcher task.
//!
//! ```text
//! Publisher ──Command──┐
//! Transport ──Event────┼──► session queue ──► PublisherTask ──Effect──► collaborators
//! Location  ──Event────┤                           │                        │
//! executor ──Outcome───┘◄──────────────────────────┼────────────────────────┘
//!                                                  └──DelegateEvent──► ForegroundDispatcher
//! ```

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod builder;
pub mod executor;
pub mod foreground;
pub mod logic;
pub mod managers;
pub mod publisher;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use builder::PublisherBuilder;
pub use executor::EffectExecutor;
pub use foreground::ForegroundDispatcher;
pub use logic::{PublisherState, PublisherStats, PublisherTask, SessionHandlers, SessionState};
pub use managers::{
    derive_logical_state, ConnectionStateAggregator, DuplicateTrackableGuard, FailureAction,
    LocationDeliveryState, ResolutionRegistry,
};
pub use publisher::Publisher;

pub use trackcast_core::*;
