//! trackcast Core
//!
//! Stable API definitions for the trackcast location publisher: value types,
//! errors, configuration, collaborator traits, resolution policies and the typed
//! protocol spoken on the publisher session queue. The session engine itself
//! lives in `trackcast-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod channel;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod location;
pub mod policy;
pub mod proximity;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{
    Command, Completion, DelegateEvent, Effect, Event, EventSender, ForegroundJob, Message,
    Outcome, SessionQueue,
};
pub use collaborators::{
    BatteryLevelProvider, LocationSource, PublisherDelegate, RouteProvider, Transport,
    UnknownBatteryLevel,
};
pub use config::{DeliveryConfig, PublisherConfig, ResolutionConfig};
pub use errors::{PublisherError, PublisherResult};
pub use location::{
    distance_between, EnhancedLocationUpdate, Location, LocationUpdate, LocationUpdateType,
    RawLocationUpdate, SkippedLocations,
};
pub use policy::{
    DefaultResolutionPolicy, DefaultResolutionPolicyFactory, PolicyMethods, ResolutionPolicy,
    ResolutionPolicyFactory, ResolutionRequest,
};
pub use proximity::{Proximity, ProximityHandler, ThresholdChecker};
pub use types::{
    Accuracy, ClientType, ConnectionState, LocationCoordinate, PresenceAction, PresenceData,
    PresenceMessage, Resolution, ResolutionConstraints, ResolutionSet, Route, RoutingProfile,
    Subscriber, SystemTimeSource, TimeSource, Timestamp, Trackable,
};
