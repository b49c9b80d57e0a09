//! Proximity thresholds and the check run against every processed location

use crate::location::{distance_between, Location};
use crate::types::{LocationCoordinate, Timestamp};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Distance or time-to-destination condition a policy can wait for
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Proximity {
    /// Distance from the destination, in metres
    pub spatial: Option<f64>,
    /// Estimated time remaining until arrival
    pub temporal: Option<Duration>,
}

impl Proximity {
    pub fn spatial(metres: f64) -> Self {
        Self {
            spatial: Some(metres),
            temporal: None,
        }
    }

    pub fn temporal(remaining: Duration) -> Self {
        Self {
            spatial: None,
            temporal: Some(remaining),
        }
    }
}

/// Receives the outcome of a registered proximity threshold
///
/// Exactly one of the two callbacks fires per registration.
pub trait ProximityHandler: Send + Sync {
    fn on_proximity_reached(&self, threshold: &Proximity);

    /// The registration was cancelled explicitly or replaced by a newer one
    fn on_proximity_cancelled(&self);
}

impl core::fmt::Debug for dyn ProximityHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ProximityHandler")
    }
}

// ----------------------------------------------------------------------------
// Threshold Checker
// ----------------------------------------------------------------------------

/// Evaluates a threshold against the current position and route estimate
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdChecker;

impl ThresholdChecker {
    /// Reached when either the spatial or the temporal condition holds
    pub fn is_threshold_reached(
        &self,
        threshold: &Proximity,
        current_location: &Location,
        current_time: Timestamp,
        destination: Option<&LocationCoordinate>,
        estimated_arrival: Option<Timestamp>,
    ) -> bool {
        self.is_spatial_reached(threshold, current_location, destination)
            || self.is_temporal_reached(threshold, current_time, estimated_arrival)
    }

    fn is_spatial_reached(
        &self,
        threshold: &Proximity,
        current_location: &Location,
        destination: Option<&LocationCoordinate>,
    ) -> bool {
        match (threshold.spatial, destination) {
            (Some(spatial), Some(destination)) => {
                distance_between(&current_location.coordinate, destination) < spatial
            }
            _ => false,
        }
    }

    fn is_temporal_reached(
        &self,
        threshold: &Proximity,
        current_time: Timestamp,
        estimated_arrival: Option<Timestamp>,
    ) -> bool {
        match (threshold.temporal, estimated_arrival) {
            (Some(temporal), Some(arrival)) => {
                ((arrival - current_time) as u128) < temporal.as_millis()
            }
            _ => false,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
