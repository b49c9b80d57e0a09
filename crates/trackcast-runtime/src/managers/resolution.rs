//! Subscriber demand and resolved resolutions per trackable

use std::collections::{BTreeMap, HashMap};
use trackcast_core::{Resolution, Subscriber};

/// Subscribers, their requested resolutions, and the policy's decisions
#[derive(Debug, Default)]
pub struct ResolutionRegistry {
    /// trackable id → subscriber id → subscriber
    subscribers: HashMap<String, BTreeMap<String, Subscriber>>,
    /// trackable id → subscriber id → latest requested resolution
    requests: HashMap<String, HashMap<String, Resolution>>,
    resolutions: HashMap<String, Resolution>,
}

impl ResolutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber and its optional request
    ///
    /// Returns `false` when the subscriber was already known; its request is
    /// replaced either way.
    pub fn add_subscriber(&mut self, subscriber: Subscriber, resolution: Option<Resolution>) -> bool {
        self.save_or_remove_request(&subscriber, resolution);
        self.subscribers
            .entry(subscriber.trackable_id.clone())
            .or_default()
            .insert(subscriber.id.clone(), subscriber)
            .is_none()
    }

    /// Replace a known subscriber's request; unknown subscribers are ignored
    pub fn update_subscriber(
        &mut self,
        trackable_id: &str,
        subscriber_id: &str,
        resolution: Option<Resolution>,
    ) -> Option<Subscriber> {
        let subscriber = self.subscribers.get(trackable_id)?.get(subscriber_id)?.clone();
        self.save_or_remove_request(&subscriber, resolution);
        Some(subscriber)
    }

    pub fn remove_subscriber(&mut self, trackable_id: &str, subscriber_id: &str) -> Option<Subscriber> {
        let subscriber = self.subscribers.get_mut(trackable_id)?.remove(subscriber_id)?;
        self.save_or_remove_request(&subscriber, None);
        Some(subscriber)
    }

    /// Requests from subscribers that stated a preference
    pub fn remote_requests(&self, trackable_id: &str) -> Vec<Resolution> {
        self.requests
            .get(trackable_id)
            .map(|requests| requests.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, trackable_id: &str) -> usize {
        self.subscribers.get(trackable_id).map_or(0, BTreeMap::len)
    }

    pub fn set_resolution(&mut self, trackable_id: &str, resolution: Resolution) {
        self.resolutions.insert(trackable_id.to_string(), resolution);
    }

    pub fn resolution(&self, trackable_id: &str) -> Option<&Resolution> {
        self.resolutions.get(trackable_id)
    }

    pub fn resolutions(&self) -> Vec<Resolution> {
        self.resolutions.values().copied().collect()
    }

    /// Forget everything about a trackable, returning its subscribers
    pub fn remove_trackable(&mut self, trackable_id: &str) -> Vec<Subscriber> {
        self.requests.remove(trackable_id);
        self.resolutions.remove(trackable_id);
        self.subscribers
            .remove(trackable_id)
            .map(|subscribers| subscribers.into_values().collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
        self.requests.clear();
        self.resolutions.clear();
    }

    fn save_or_remove_request(&mut self, subscriber: &Subscriber, resolution: Option<Resolution>) {
        let requests = self
            .requests
            .entry(subscriber.trackable_id.clone())
            .or_default();
        match resolution {
            Some(resolution) => {
                requests.insert(subscriber.id.clone(), resolution);
            }
            None => {
                requests.remove(&subscriber.id);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
