//! Foreground Dispatcher
//!
//! Runs every callback completion and delegate notification on one task, in the
//! order they were posted.

use std::sync::Weak;
use tracing::trace;
use trackcast_core::channel::ForegroundReceiver;
use trackcast_core::{DelegateEvent, ForegroundJob, PublisherDelegate};

pub struct ForegroundDispatcher {
    receiver: ForegroundReceiver,
    delegate: Option<Weak<dyn PublisherDelegate>>,
}

impl ForegroundDispatcher {
    pub fn new(receiver: ForegroundReceiver, delegate: Option<Weak<dyn PublisherDelegate>>) -> Self {
        Self { receiver, delegate }
    }

    /// Run until every foreground sender is gone
    pub async fn run(mut self) {
        while let Some(job) = self.receiver.recv().await {
            match job {
                ForegroundJob::Callback(callback) => callback(),
                ForegroundJob::Delegate(event) => self.notify(event),
            }
        }
        trace!("Foreground dispatcher finished");
    }

    fn notify(&self, event: DelegateEvent) {
        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            trace!(%event, "No delegate, dropping notification");
            return;
        };
        match event {
            DelegateEvent::Error { error } => delegate.on_error(&error),
            DelegateEvent::ConnectionStateChanged { trackable, state } => {
                delegate.on_connection_state_changed(&trackable, state)
            }
            DelegateEvent::EnhancedLocationChanged { update } => {
                delegate.on_enhanced_location_changed(&update)
            }
            DelegateEvent::ResolutionChanged { resolution } => {
                delegate.on_resolution_changed(&resolution)
            }
            DelegateEvent::TrackablesChanged { trackables } => {
                delegate.on_trackables_changed(&trackables)
            }
            DelegateEvent::ProximityReached { threshold } => delegate.on_proximity_reached(&threshold),
            DelegateEvent::ProximityCancelled => delegate.on_proximity_cancelled(),
        }
    }
}
