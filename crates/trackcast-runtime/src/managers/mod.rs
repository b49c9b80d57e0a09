//! Stateful managers for the publisher runtime
//!
//! Each manager owns one slice of session state. They are plain data structures
//! driven exclusively by the publisher task.

pub mod connection;
pub mod delivery;
pub mod duplicate_guard;
pub mod resolution;

pub use connection::{derive_logical_state, ConnectionStateAggregator};
pub use delivery::{FailureAction, LocationDeliveryState};
pub use duplicate_guard::DuplicateTrackableGuard;
pub use resolution::ResolutionRegistry;
