//! Publisher Session State
//!
//! Everything the publisher task owns. Nothing here is shared; the task is the
//! only writer.

use crate::managers::{
    ConnectionStateAggregator, DuplicateTrackableGuard, LocationDeliveryState, ResolutionRegistry,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use trackcast_core::{
    Completion, ConnectionState, EnhancedLocationUpdate, PresenceData, PresenceMessage, Proximity,
    ProximityHandler,
    PublisherConfig, RawLocationUpdate, Resolution, ResolutionPolicy, Route, RoutingProfile,
    SessionQueue, TimeSource, Trackable,
};

// ----------------------------------------------------------------------------
// Session Lifecycle
// ----------------------------------------------------------------------------

/// Lifecycle of a publisher session
///
/// `Connecting`, `Connected` and `Disconnecting` are reserved; no transition
/// currently enters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnecting,
    Stopping,
    Stopped,
}

impl SessionState {
    pub fn is_stopping_or_stopped(&self) -> bool {
        matches!(self, SessionState::Stopping | SessionState::Stopped)
    }
}

// ----------------------------------------------------------------------------
// Proximity Registration
// ----------------------------------------------------------------------------

/// A policy's pending proximity threshold
#[derive(Debug)]
pub struct ProximityRegistration {
    pub threshold: Proximity,
    pub handler: Box<dyn ProximityHandler>,
}

// ----------------------------------------------------------------------------
// Early Signals
// ----------------------------------------------------------------------------

/// Transport signal for a trackable that is subscribed but has not joined yet
///
/// Replayed in arrival order once the trackable joins.
#[derive(Debug, Clone, PartialEq)]
pub enum EarlySignal {
    Presence(PresenceMessage),
    Channel(ConnectionState),
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherStats {
    pub commands_processed: u64,
    pub events_processed: u64,
    pub outcomes_processed: u64,
    pub locations_sent: u64,
    pub send_retries: u64,
    pub locations_skipped: u64,
}

// ----------------------------------------------------------------------------
// Publisher State
// ----------------------------------------------------------------------------

/// Session state owned by the publisher task
pub struct PublisherState {
    pub session: SessionState,
    pub config: PublisherConfig,
    /// Tracked trackables keyed by id
    pub trackables: BTreeMap<String, Trackable>,
    pub active_trackable: Option<Trackable>,
    /// Route to the active trackable's destination
    pub route: Option<Route>,
    pub routing_profile: RoutingProfile,
    pub resolutions: ResolutionRegistry,
    /// Resolution last applied to the location engine
    pub engine_resolution: Option<Resolution>,
    pub enhanced_delivery: HashMap<String, LocationDeliveryState<EnhancedLocationUpdate>>,
    pub raw_delivery: HashMap<String, LocationDeliveryState<RawLocationUpdate>>,
    /// Last generation handed to a delivery state
    pub delivery_generation: u64,
    pub connections: ConnectionStateAggregator,
    pub duplicate_guard: DuplicateTrackableGuard,
    /// Signals held back while a trackable's add is in flight
    pub early_signals: HashMap<String, Vec<EarlySignal>>,
    /// Whether location updating and recording are running
    pub sensing: bool,
    pub proximity: Option<ProximityRegistration>,
    pub stop_completions: Vec<Completion<()>>,
    pub policy: Box<dyn ResolutionPolicy>,
    pub queue: SessionQueue,
    pub time_source: Arc<dyn TimeSource>,
    pub stats: PublisherStats,
}

impl PublisherState {
    pub fn new(
        config: PublisherConfig,
        policy: Box<dyn ResolutionPolicy>,
        queue: SessionQueue,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            session: SessionState::Idle,
            routing_profile: config.routing_profile,
            engine_resolution: config.resolution.constant_engine_resolution,
            config,
            trackables: BTreeMap::new(),
            active_trackable: None,
            route: None,
            resolutions: ResolutionRegistry::new(),
            enhanced_delivery: HashMap::new(),
            raw_delivery: HashMap::new(),
            delivery_generation: 0,
            connections: ConnectionStateAggregator::new(),
            duplicate_guard: DuplicateTrackableGuard::new(),
            early_signals: HashMap::new(),
            sensing: false,
            proximity: None,
            stop_completions: Vec::new(),
            policy,
            queue,
            time_source,
            stats: PublisherStats::default(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.session.is_stopping_or_stopped()
    }

    /// Presence data this publisher announces on every channel
    pub fn presence_data(&self) -> PresenceData {
        PresenceData::publisher(self.config.raw_locations_enabled)
    }

    pub fn trackable_list(&self) -> Vec<Trackable> {
        self.trackables.values().cloned().collect()
    }

    pub fn is_active(&self, trackable_id: &str) -> bool {
        self.active_trackable
            .as_ref()
            .is_some_and(|active| active.id == trackable_id)
    }

    /// Drop every per-trackable record once the session has stopped
    pub fn clear(&mut self) {
        self.trackables.clear();
        self.active_trackable = None;
        self.route = None;
        self.resolutions.clear();
        self.enhanced_delivery.clear();
        self.raw_delivery.clear();
        self.early_signals.clear();
        self.connections.clear();
        self.proximity = None;
        self.sensing = false;
    }
}

impl std::fmt::Debug for PublisherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherState")
            .field("session", &self.session)
            .field("trackables", &self.trackables.len())
            .field("active_trackable", &self.active_trackable.as_ref().map(|t| &t.id))
            .field("routing_profile", &self.routing_profile)
            .field("sensing", &self.sensing)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
