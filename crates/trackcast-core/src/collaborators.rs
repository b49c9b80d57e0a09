//! Collaborator Trait Definitions
//!
//! Interfaces for the external systems the publisher drives. Concrete
//! implementations (pub/sub client, map-matching engine, routing service) live
//! outside this workspace.
//!
//! ## Architecture
//!
//! Collaborators never touch session state. They receive an `EventSender` when
//! the publisher is built and report everything back through it; results of calls
//! made by the publisher are returned from the async methods and re-enter the
//! session queue as outcomes.

use crate::channel::EventSender;
use crate::errors::PublisherResult;
use crate::location::{EnhancedLocationUpdate, RawLocationUpdate};
use crate::proximity::Proximity;
use crate::types::{
    ConnectionState, LocationCoordinate, PresenceData, Resolution, Route, RoutingProfile,
    Trackable,
};
use async_trait::async_trait;

// ----------------------------------------------------------------------------
// Transport
// ----------------------------------------------------------------------------

/// Pub/sub transport with presence
#[async_trait]
pub trait Transport: Send + Sync {
    /// Store the sender used to report connection, presence and error events
    fn attach_events(&mut self, events: EventSender);

    /// Enter presence on the trackable's channel
    async fn connect(&self, trackable_id: &str, presence_data: PresenceData) -> PublisherResult<()>;

    /// Leave the trackable's channel, returning whether it was present
    async fn disconnect(
        &self,
        trackable_id: &str,
        presence_data: PresenceData,
    ) -> PublisherResult<bool>;

    /// Start forwarding presence messages for the trackable
    fn subscribe_for_presence_messages(&self, trackable_id: &str) -> PublisherResult<()>;

    /// Start forwarding channel state changes for the trackable
    fn subscribe_for_channel_state(&self, trackable_id: &str) -> PublisherResult<()>;

    async fn send_enhanced_location(
        &self,
        trackable_id: &str,
        update: EnhancedLocationUpdate,
    ) -> PublisherResult<()>;

    async fn send_raw_location(
        &self,
        trackable_id: &str,
        update: RawLocationUpdate,
    ) -> PublisherResult<()>;

    async fn update_presence_data(
        &self,
        trackable_id: &str,
        presence_data: PresenceData,
    ) -> PublisherResult<()>;

    /// Leave every channel and close the connection
    async fn close(&self, presence_data: PresenceData) -> PublisherResult<()>;
}

// ----------------------------------------------------------------------------
// Location Sensing
// ----------------------------------------------------------------------------

/// Device location engine
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Store the sender used to report raw and enhanced locations and sensing errors
    fn attach_events(&mut self, events: EventSender);

    fn start_updating(&self);

    fn stop_updating(&self);

    fn start_recording(&self);

    /// Stop recording and finalize the recorded history
    async fn stop_recording(&self) -> PublisherResult<()>;

    fn change_resolution(&self, resolution: &Resolution);
}

// ----------------------------------------------------------------------------
// Routing
// ----------------------------------------------------------------------------

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_route(
        &self,
        destination: LocationCoordinate,
        profile: RoutingProfile,
    ) -> PublisherResult<Route>;
}

// ----------------------------------------------------------------------------
// Battery
// ----------------------------------------------------------------------------

/// Source of the device battery level
pub trait BatteryLevelProvider: Send + Sync {
    /// Current charge as a percentage in 0..=100, if known
    fn battery_level(&self) -> Option<f32>;
}

/// Provider for devices that cannot report a battery level
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownBatteryLevel;

impl BatteryLevelProvider for UnknownBatteryLevel {
    fn battery_level(&self) -> Option<f32> {
        None
    }
}

// ----------------------------------------------------------------------------
// Delegate
// ----------------------------------------------------------------------------

/// Receives publisher notifications on the foreground dispatcher
///
/// The publisher holds the delegate weakly; every method defaults to a no-op.
pub trait PublisherDelegate: Send + Sync {
    fn on_error(&self, _error: &crate::errors::PublisherError) {}

    fn on_connection_state_changed(&self, _trackable: &Trackable, _state: ConnectionState) {}

    fn on_enhanced_location_changed(&self, _update: &EnhancedLocationUpdate) {}

    fn on_resolution_changed(&self, _resolution: &Resolution) {}

    fn on_trackables_changed(&self, _trackables: &[Trackable]) {}

    fn on_proximity_reached(&self, _threshold: &Proximity) {}

    fn on_proximity_cancelled(&self) {}
}
