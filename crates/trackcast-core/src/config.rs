//! Centralized Configuration Management
//!
//! All tunables of a publisher session live in `PublisherConfig`, grouped the
//! same way the session components consume them.

use crate::errors::{PublisherError, PublisherResult};
use crate::types::{Resolution, RoutingProfile};

// ----------------------------------------------------------------------------
// Delivery Configuration
// ----------------------------------------------------------------------------

/// Configuration for per-trackable location delivery
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeliveryConfig {
    /// Resends attempted after a failed send before the location is skipped
    pub max_retry_count: u32,
    /// Capacity of the skipped-locations buffer per trackable and stream
    pub max_skipped_locations: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retry_count: 1,
            max_skipped_locations: 60,
        }
    }
}

// ----------------------------------------------------------------------------
// Resolution Configuration
// ----------------------------------------------------------------------------

/// Configuration for resolution negotiation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolutionConfig {
    /// Announce each trackable's resolution in the publisher's presence data
    pub send_resolution_enabled: bool,
    /// Fixed sensor resolution; disables the merged engine resolution when set
    pub constant_engine_resolution: Option<Resolution>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            send_resolution_enabled: true,
            constant_engine_resolution: None,
        }
    }
}

// ----------------------------------------------------------------------------
// Publisher Configuration
// ----------------------------------------------------------------------------

/// Complete publisher configuration
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PublisherConfig {
    pub delivery: DeliveryConfig,
    pub resolution: ResolutionConfig,
    /// Publish raw device locations alongside enhanced ones
    pub raw_locations_enabled: bool,
    /// Routing profile used until `change_routing_profile` is called
    pub routing_profile: RoutingProfile,
}

impl PublisherConfig {
    /// Configuration for tests: raw locations on, resolution announcements off
    pub fn testing() -> Self {
        Self {
            raw_locations_enabled: true,
            resolution: ResolutionConfig {
                send_resolution_enabled: false,
                constant_engine_resolution: None,
            },
            ..Self::default()
        }
    }

    pub fn with_raw_locations(mut self, enabled: bool) -> Self {
        self.raw_locations_enabled = enabled;
        self
    }

    pub fn with_constant_engine_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution.constant_engine_resolution = Some(resolution);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> PublisherResult<()> {
        if self.delivery.max_skipped_locations == 0 {
            return Err(PublisherError::config_error(
                "max_skipped_locations must be greater than zero",
            ));
        }
        if let Some(resolution) = &self.resolution.constant_engine_resolution {
            if resolution.desired_interval < 0.0 || resolution.minimum_displacement < 0.0 {
                return Err(PublisherError::config_error(
                    "constant engine resolution must not be negative",
                ));
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
