//! Core value types for the trackcast publisher
//!
//! Trackables, resolutions, subscribers, presence payloads and the small time
//! abstraction used by the session.

use crate::proximity::Proximity;
use core::hash::{Hash, Hasher};
use core::ops::{Add, Sub};
use core::time::Duration;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, other: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(other.as_millis() as u64))
    }
}

impl Sub for Timestamp {
    type Output = u64;

    fn sub(self, other: Timestamp) -> u64 {
        self.0.saturating_sub(other.0)
    }
}

impl Timestamp {
    /// Create a new timestamp
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get current wall clock timestamp
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    /// Get the raw milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since an earlier timestamp, zero if `earlier` is later
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        (*self - earlier) as f64 / 1000.0
    }
}

// ----------------------------------------------------------------------------
// Time Source Trait
// ----------------------------------------------------------------------------

/// Trait for providing timestamps
///
/// The session reads the clock only through this trait so tests can pin time.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp
    fn now(&self) -> Timestamp;
}

/// Wall clock implementation of TimeSource
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

// ----------------------------------------------------------------------------
// Coordinates
// ----------------------------------------------------------------------------

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// ----------------------------------------------------------------------------
// Resolution
// ----------------------------------------------------------------------------

/// Accuracy class requested from the location engine, ordered lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Minimum,
    Low,
    Balanced,
    High,
    Maximum,
}

/// Desired sampling cadence and precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub accuracy: Accuracy,
    /// Desired interval between locations, in milliseconds
    pub desired_interval: f64,
    /// Minimum distance between published locations, in metres
    pub minimum_displacement: f64,
}

impl Resolution {
    pub fn new(accuracy: Accuracy, desired_interval: f64, minimum_displacement: f64) -> Self {
        Self {
            accuracy,
            desired_interval,
            minimum_displacement,
        }
    }

    /// Combine two resolutions into the most demanding one
    ///
    /// Highest accuracy, shortest interval and smallest displacement win.
    pub fn merge(&self, other: &Resolution) -> Resolution {
        Resolution {
            accuracy: self.accuracy.max(other.accuracy),
            desired_interval: self.desired_interval.min(other.desired_interval),
            minimum_displacement: self.minimum_displacement.min(other.minimum_displacement),
        }
    }

    /// Merge a collection, returning `None` when it is empty
    pub fn merge_all<'a, I>(resolutions: I) -> Option<Resolution>
    where
        I: IntoIterator<Item = &'a Resolution>,
    {
        resolutions
            .into_iter()
            .fold(None, |acc: Option<Resolution>, next| match acc {
                Some(current) => Some(current.merge(next)),
                None => Some(*next),
            })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Balanced,
            desired_interval: 500.0,
            minimum_displacement: 500.0,
        }
    }
}

/// Resolutions chosen by proximity to destination and subscriber presence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSet {
    pub far_without_subscriber: Resolution,
    pub far_with_subscriber: Resolution,
    pub near_without_subscriber: Resolution,
    pub near_with_subscriber: Resolution,
}

impl ResolutionSet {
    /// A set that uses the same resolution in every situation
    pub fn uniform(resolution: Resolution) -> Self {
        Self {
            far_without_subscriber: resolution,
            far_with_subscriber: resolution,
            near_without_subscriber: resolution,
            near_with_subscriber: resolution,
        }
    }

    pub fn select(&self, near: bool, has_subscribers: bool) -> Resolution {
        match (near, has_subscribers) {
            (false, false) => self.far_without_subscriber,
            (false, true) => self.far_with_subscriber,
            (true, false) => self.near_without_subscriber,
            (true, true) => self.near_with_subscriber,
        }
    }
}

/// Per-trackable constraints honoured by the default resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConstraints {
    pub resolutions: ResolutionSet,
    pub proximity_threshold: Proximity,
    /// Battery percentage (0-100) under which the interval is stretched
    pub battery_level_threshold: f32,
    pub low_battery_multiplier: f64,
}

// ----------------------------------------------------------------------------
// Trackable
// ----------------------------------------------------------------------------

/// A logical asset whose location is published
///
/// Equality and hashing use `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trackable {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub destination: Option<LocationCoordinate>,
    #[serde(default)]
    pub constraints: Option<ResolutionConstraints>,
}

impl Trackable {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self {
            id: id.into(),
            metadata: None,
            destination: None,
            constraints: None,
        }
    }

    pub fn with_metadata<T: Into<String>>(mut self, metadata: T) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_destination(mut self, destination: LocationCoordinate) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_constraints(mut self, constraints: ResolutionConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

impl PartialEq for Trackable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Trackable {}

impl Hash for Trackable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ----------------------------------------------------------------------------
// Subscribers and Presence
// ----------------------------------------------------------------------------

/// A remote client watching a trackable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub trackable_id: String,
}

impl Subscriber {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, trackable_id: T) -> Self {
        Self {
            id: id.into(),
            trackable_id: trackable_id.into(),
        }
    }
}

/// Kind of client announcing presence on a trackable channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClientType {
    Publisher,
    Subscriber,
}

/// Presence transitions reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceAction {
    Present,
    Enter,
    Leave,
    Update,
    Absent,
}

/// Data attached to a presence announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceData {
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_locations: Option<bool>,
}

impl PresenceData {
    /// Presence data announced by this publisher
    pub fn publisher(raw_locations: bool) -> Self {
        Self {
            client_type: ClientType::Publisher,
            resolution: None,
            raw_locations: raw_locations.then_some(true),
        }
    }

    /// Presence data announced by a subscriber, optionally requesting a resolution
    pub fn subscriber(resolution: Option<Resolution>) -> Self {
        Self {
            client_type: ClientType::Subscriber,
            resolution,
            raw_locations: None,
        }
    }

    pub fn with_resolution(&self, resolution: Resolution) -> Self {
        Self {
            resolution: Some(resolution),
            ..self.clone()
        }
    }
}

/// A presence update received for one trackable's channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMessage {
    pub action: PresenceAction,
    pub data: PresenceData,
    pub client_id: String,
}

// ----------------------------------------------------------------------------
// Connectivity and Routing
// ----------------------------------------------------------------------------

/// Connection state, used for raw transport signals and the derived logical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Online,
    Offline,
    Failed,
}

/// Mode of travel used when computing routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingProfile {
    #[default]
    Driving,
    Cycling,
    Walking,
    DrivingTraffic,
}

/// A computed route to the active trackable's destination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub expected_travel_time: Duration,
    pub distance: f64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
