//! Location fixes and the updates published for them

use crate::types::{LocationCoordinate, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Mean Earth radius in metres
const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

// ----------------------------------------------------------------------------
// Location
// ----------------------------------------------------------------------------

/// A single location fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: LocationCoordinate,
    pub timestamp: Timestamp,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timestamp: Timestamp) -> Self {
        Self {
            coordinate: LocationCoordinate::new(latitude, longitude),
            timestamp,
        }
    }

    /// Great-circle distance to another location, in metres
    pub fn distance_to(&self, other: &Location) -> f64 {
        distance_between(&self.coordinate, &other.coordinate)
    }
}

/// Haversine distance between two coordinates, in metres
pub fn distance_between(from: &LocationCoordinate, to: &LocationCoordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points
    2.0 * EARTH_RADIUS_METRES * a.sqrt().min(1.0).asin()
}

// ----------------------------------------------------------------------------
// Location Updates
// ----------------------------------------------------------------------------

/// Common view over the update kinds handed to the transport
pub trait LocationUpdate: Clone + Send + 'static {
    fn location(&self) -> &Location;

    fn skipped_locations(&self) -> &[Location];

    fn set_skipped_locations(&mut self, skipped: Vec<Location>);
}

/// Whether an enhanced location was observed or extrapolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationUpdateType {
    Predicted,
    Actual,
}

/// A map-matched location produced by the sensing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLocationUpdate {
    pub location: Location,
    #[serde(default)]
    pub skipped_locations: Vec<Location>,
    #[serde(default)]
    pub intermediate_locations: Vec<Location>,
    #[serde(rename = "type")]
    pub update_type: LocationUpdateType,
}

impl EnhancedLocationUpdate {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            skipped_locations: Vec::new(),
            intermediate_locations: Vec::new(),
            update_type: LocationUpdateType::Actual,
        }
    }
}

impl LocationUpdate for EnhancedLocationUpdate {
    fn location(&self) -> &Location {
        &self.location
    }

    fn skipped_locations(&self) -> &[Location] {
        &self.skipped_locations
    }

    fn set_skipped_locations(&mut self, skipped: Vec<Location>) {
        self.skipped_locations = skipped;
    }
}

/// An unprocessed location straight from the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocationUpdate {
    pub location: Location,
    #[serde(default)]
    pub skipped_locations: Vec<Location>,
}

impl RawLocationUpdate {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            skipped_locations: Vec::new(),
        }
    }
}

impl LocationUpdate for RawLocationUpdate {
    fn location(&self) -> &Location {
        &self.location
    }

    fn skipped_locations(&self) -> &[Location] {
        &self.skipped_locations
    }

    fn set_skipped_locations(&mut self, skipped: Vec<Location>) {
        self.skipped_locations = skipped;
    }
}

// ----------------------------------------------------------------------------
// Skipped Locations
// ----------------------------------------------------------------------------

/// Bounded FIFO of locations whose send failed
///
/// When full, pushing evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct SkippedLocations {
    capacity: usize,
    locations: VecDeque<Location>,
}

impl SkippedLocations {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            locations: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, location: Location) {
        if self.capacity == 0 {
            return;
        }
        if self.locations.len() == self.capacity {
            self.locations.pop_front();
        }
        self.locations.push_back(location);
    }

    /// Take every buffered location, oldest first, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<Location> {
        self.locations.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
