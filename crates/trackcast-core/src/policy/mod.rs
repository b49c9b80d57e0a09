//! Resolution policy interfaces
//!
//! A policy turns subscriber demand into resolutions. The publisher creates one
//! policy per session through a `ResolutionPolicyFactory`, feeds it lifecycle
//! hooks, and hands it `PolicyMethods` for requesting work back on the session.

pub mod default;

pub use default::{DefaultResolutionPolicy, DefaultResolutionPolicyFactory};

use crate::channel::{Command, SessionQueue};
use crate::proximity::{Proximity, ProximityHandler};
use crate::types::{Resolution, Subscriber, Trackable};
use tracing::debug;

// ----------------------------------------------------------------------------
// Resolution Request
// ----------------------------------------------------------------------------

/// Input for resolving one trackable
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub trackable: Trackable,
    /// Latest resolution announced by each subscriber that stated one
    pub remote_requests: Vec<Resolution>,
}

// ----------------------------------------------------------------------------
// Policy Traits
// ----------------------------------------------------------------------------

/// Strategy mapping demand to resolutions
///
/// `resolve` and `resolve_all` must be pure with respect to their inputs and the
/// state accumulated through the hooks.
pub trait ResolutionPolicy: Send {
    /// Resolution for one trackable given its subscribers' requests
    fn resolve(&mut self, request: &ResolutionRequest) -> Resolution;

    /// Single sensor resolution covering every tracked trackable
    fn resolve_all(&mut self, resolutions: &[Resolution]) -> Resolution;

    fn on_trackable_added(&mut self, _trackable: &Trackable) {}

    fn on_trackable_removed(&mut self, _trackable: &Trackable) {}

    fn on_active_trackable_changed(&mut self, _trackable: Option<&Trackable>) {}

    fn on_subscriber_added(&mut self, _subscriber: &Subscriber) {}

    fn on_subscriber_removed(&mut self, _subscriber: &Subscriber) {}
}

/// Creates the policy used by a publisher session
pub trait ResolutionPolicyFactory: Send {
    fn create_policy(&self, methods: PolicyMethods) -> Box<dyn ResolutionPolicy>;
}

// ----------------------------------------------------------------------------
// Policy Methods
// ----------------------------------------------------------------------------

/// Requests a policy can make of the session
///
/// Every call is queued; nothing runs synchronously.
#[derive(Debug, Clone)]
pub struct PolicyMethods {
    queue: SessionQueue,
}

impl PolicyMethods {
    pub fn new(queue: SessionQueue) -> Self {
        Self { queue }
    }

    /// Re-resolve every tracked trackable
    pub fn refresh(&self) {
        self.submit(Command::RefreshResolutionPolicy);
    }

    /// Register a threshold, cancelling any previous registration
    pub fn set_proximity_threshold(&self, threshold: Proximity, handler: Box<dyn ProximityHandler>) {
        self.submit(Command::SetProximityThreshold { threshold, handler });
    }

    pub fn cancel_proximity_threshold(&self) {
        self.submit(Command::CancelProximityThreshold);
    }

    fn submit(&self, command: Command) {
        let name = command.name();
        if let Err(e) = self.queue.enqueue(command) {
            debug!("Dropping policy request {}: {}", name, e);
        }
    }
}
