//! Connection state aggregation for the publisher runtime
//!
//! Combines the client-level transport state, each trackable's channel state and
//! whether an enhanced location has been delivered for it into one logical state
//! per trackable. A change is reported only when the logical state differs from
//! the one last reported.

use std::collections::HashMap;
use trackcast_core::ConnectionState;

// ----------------------------------------------------------------------------
// Connection Signals
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct TrackableSignals {
    channel_state: Option<ConnectionState>,
    has_sent_location: bool,
    last_reported: Option<ConnectionState>,
}

/// Derive the logical state from raw signals
///
/// A channel that never reported counts as offline.
pub fn derive_logical_state(
    client: ConnectionState,
    channel: ConnectionState,
    has_sent_location: bool,
) -> ConnectionState {
    match (client, channel) {
        (ConnectionState::Online, ConnectionState::Online) if has_sent_location => {
            ConnectionState::Online
        }
        (ConnectionState::Online, ConnectionState::Online) => ConnectionState::Offline,
        (ConnectionState::Online, ConnectionState::Offline) => ConnectionState::Offline,
        (ConnectionState::Online, ConnectionState::Failed) => ConnectionState::Failed,
        (ConnectionState::Offline, _) => ConnectionState::Offline,
        (ConnectionState::Failed, _) => ConnectionState::Failed,
    }
}

// ----------------------------------------------------------------------------
// Connection State Aggregator
// ----------------------------------------------------------------------------

/// Tracks raw connectivity signals and debounces logical state changes
#[derive(Debug)]
pub struct ConnectionStateAggregator {
    client_state: ConnectionState,
    trackables: HashMap<String, TrackableSignals>,
}

impl Default for ConnectionStateAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateAggregator {
    pub fn new() -> Self {
        Self {
            client_state: ConnectionState::Offline,
            trackables: HashMap::new(),
        }
    }

    /// Record a client state change and re-derive every listed trackable
    ///
    /// Returns the trackables whose logical state changed.
    pub fn update_client_state<'a, I>(
        &mut self,
        state: ConnectionState,
        trackable_ids: I,
    ) -> Vec<(String, ConnectionState)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.client_state = state;
        trackable_ids
            .into_iter()
            .filter_map(|id| self.refresh(id).map(|state| (id.clone(), state)))
            .collect()
    }

    pub fn update_channel_state(
        &mut self,
        trackable_id: &str,
        state: ConnectionState,
    ) -> Option<ConnectionState> {
        self.signals(trackable_id).channel_state = Some(state);
        self.refresh(trackable_id)
    }

    /// Record that an enhanced location was delivered for the trackable
    pub fn mark_location_sent(&mut self, trackable_id: &str) -> Option<ConnectionState> {
        let signals = self.signals(trackable_id);
        if signals.has_sent_location {
            return None;
        }
        signals.has_sent_location = true;
        self.refresh(trackable_id)
    }

    pub fn client_state(&self) -> ConnectionState {
        self.client_state
    }

    pub fn logical_state(&self, trackable_id: &str) -> Option<ConnectionState> {
        self.trackables
            .get(trackable_id)
            .and_then(|signals| signals.last_reported)
    }

    pub fn remove_trackable(&mut self, trackable_id: &str) {
        self.trackables.remove(trackable_id);
    }

    pub fn clear(&mut self) {
        self.trackables.clear();
    }

    fn signals(&mut self, trackable_id: &str) -> &mut TrackableSignals {
        self.trackables
            .entry(trackable_id.to_string())
            .or_default()
    }

    fn refresh(&mut self, trackable_id: &str) -> Option<ConnectionState> {
        let client_state = self.client_state;
        let signals = self.signals(trackable_id);
        let logical = derive_logical_state(
            client_state,
            signals.channel_state.unwrap_or(ConnectionState::Offline),
            signals.has_sent_location,
        );
        if signals.last_reported == Some(logical) {
            return None;
        }
        signals.last_reported = Some(logical);
        Some(logical)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::{Failed, Offline, Online};

    #[test]
    fn test_derivation_table() {
        assert_eq!(derive_logical_state(Online, Online, true), Online);
        assert_eq!(derive_logical_state(Online, Online, false), Offline);
        assert_eq!(derive_logical_state(Online, Offline, true), Offline);
        assert_eq!(derive_logical_state(Online, Failed, false), Failed);
        for channel in [Online, Offline, Failed] {
            assert_eq!(derive_logical_state(Offline, channel, true), Offline);
            assert_eq!(derive_logical_state(Failed, channel, true), Failed);
        }
    }

    #[test]
    fn test_first_derivation_is_reported() {
        let mut aggregator = ConnectionStateAggregator::new();
        assert_eq!(aggregator.update_channel_state("t1", Online), Some(Offline));
        assert_eq!(aggregator.logical_state("t1"), Some(Offline));
    }

    #[test]
    fn test_identical_states_are_debounced() {
        let mut aggregator = ConnectionStateAggregator::new();
        let ids = vec!["t1".to_string()];
        assert_eq!(aggregator.client_state(), Offline);

        assert_eq!(aggregator.update_channel_state("t1", Online), Some(Offline));
        assert!(aggregator.update_client_state(Online, &ids).is_empty());
        assert_eq!(aggregator.client_state(), Online);
        assert_eq!(aggregator.update_channel_state("t1", Online), None);

        assert_eq!(aggregator.mark_location_sent("t1"), Some(Online));
        assert_eq!(aggregator.mark_location_sent("t1"), None);
        assert_eq!(aggregator.update_channel_state("t1", Online), None);

        assert_eq!(
            aggregator.update_client_state(Failed, &ids),
            vec![("t1".to_string(), Failed)]
        );
        assert!(aggregator.update_client_state(Failed, &ids).is_empty());
    }

    #[test]
    fn test_removed_trackable_starts_fresh() {
        let mut aggregator = ConnectionStateAggregator::new();
        aggregator.update_channel_state("t1", Failed);
        aggregator.remove_trackable("t1");
        assert_eq!(aggregator.logical_state("t1"), None);
        assert_eq!(aggregator.update_channel_state("t1", Failed), Some(Offline));
    }
}
