//! Default resolution policy
//!
//! Unconstrained trackables get the merge of their subscribers' requests, or the
//! configured default when nobody asked for anything. Trackables carrying
//! `ResolutionConstraints` start from the constraint set entry matching
//! "near destination?" and "has subscribers?", merge in remote requests, and
//! stretch the interval when the battery runs low.

use super::{PolicyMethods, ResolutionPolicy, ResolutionPolicyFactory, ResolutionRequest};
use crate::collaborators::{BatteryLevelProvider, UnknownBatteryLevel};
use crate::proximity::{Proximity, ProximityHandler};
use crate::types::{Resolution, ResolutionConstraints, Subscriber, Trackable};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Factory
// ----------------------------------------------------------------------------

/// Factory for `DefaultResolutionPolicy`
#[derive(Clone)]
pub struct DefaultResolutionPolicyFactory {
    default_resolution: Resolution,
    battery: Arc<dyn BatteryLevelProvider>,
}

impl DefaultResolutionPolicyFactory {
    pub fn new(default_resolution: Resolution) -> Self {
        Self {
            default_resolution,
            battery: Arc::new(UnknownBatteryLevel),
        }
    }

    pub fn with_battery_provider(mut self, battery: Arc<dyn BatteryLevelProvider>) -> Self {
        self.battery = battery;
        self
    }
}

impl ResolutionPolicyFactory for DefaultResolutionPolicyFactory {
    fn create_policy(&self, methods: PolicyMethods) -> Box<dyn ResolutionPolicy> {
        Box::new(DefaultResolutionPolicy::new(
            methods,
            self.default_resolution,
            self.battery.clone(),
        ))
    }
}

// ----------------------------------------------------------------------------
// Policy
// ----------------------------------------------------------------------------

pub struct DefaultResolutionPolicy {
    methods: PolicyMethods,
    default_resolution: Resolution,
    battery: Arc<dyn BatteryLevelProvider>,
    /// Subscriber count per trackable id
    subscribers: HashMap<String, usize>,
    /// Set once the active trackable's proximity threshold has been reached
    near_destination: Arc<AtomicBool>,
}

impl DefaultResolutionPolicy {
    pub fn new(
        methods: PolicyMethods,
        default_resolution: Resolution,
        battery: Arc<dyn BatteryLevelProvider>,
    ) -> Self {
        Self {
            methods,
            default_resolution,
            battery,
            subscribers: HashMap::new(),
            near_destination: Arc::new(AtomicBool::new(false)),
        }
    }

    fn has_subscribers(&self, trackable: &Trackable) -> bool {
        self.subscribers.get(&trackable.id).copied().unwrap_or(0) > 0
    }

    fn resolve_constrained(
        &self,
        request: &ResolutionRequest,
        constraints: &ResolutionConstraints,
    ) -> Resolution {
        let near = self.near_destination.load(Ordering::SeqCst);
        let base = constraints
            .resolutions
            .select(near, self.has_subscribers(&request.trackable));
        let merged = request
            .remote_requests
            .iter()
            .fold(base, |acc, remote| acc.merge(remote));
        self.adjust_for_battery(merged, constraints)
    }

    fn adjust_for_battery(
        &self,
        resolution: Resolution,
        constraints: &ResolutionConstraints,
    ) -> Resolution {
        match self.battery.battery_level() {
            Some(level) if level < constraints.battery_level_threshold => Resolution {
                desired_interval: resolution.desired_interval * constraints.low_battery_multiplier,
                ..resolution
            },
            _ => resolution,
        }
    }
}

impl ResolutionPolicy for DefaultResolutionPolicy {
    fn resolve(&mut self, request: &ResolutionRequest) -> Resolution {
        match &request.trackable.constraints {
            Some(constraints) => self.resolve_constrained(request, constraints),
            None => Resolution::merge_all(&request.remote_requests)
                .unwrap_or(self.default_resolution),
        }
    }

    fn resolve_all(&mut self, resolutions: &[Resolution]) -> Resolution {
        Resolution::merge_all(resolutions).unwrap_or(self.default_resolution)
    }

    fn on_trackable_removed(&mut self, trackable: &Trackable) {
        self.subscribers.remove(&trackable.id);
    }

    fn on_active_trackable_changed(&mut self, trackable: Option<&Trackable>) {
        match trackable.and_then(|t| t.constraints.as_ref()) {
            Some(constraints) => {
                let handler = NearDestinationHandler {
                    near_destination: self.near_destination.clone(),
                    methods: self.methods.clone(),
                };
                self.methods
                    .set_proximity_threshold(constraints.proximity_threshold, Box::new(handler));
            }
            None => self.methods.cancel_proximity_threshold(),
        }
    }

    fn on_subscriber_added(&mut self, subscriber: &Subscriber) {
        *self
            .subscribers
            .entry(subscriber.trackable_id.clone())
            .or_insert(0) += 1;
    }

    fn on_subscriber_removed(&mut self, subscriber: &Subscriber) {
        if let Some(count) = self.subscribers.get_mut(&subscriber.trackable_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.subscribers.remove(&subscriber.trackable_id);
            }
        }
    }
}

/// Flips the policy between its near and far resolutions
struct NearDestinationHandler {
    near_destination: Arc<AtomicBool>,
    methods: PolicyMethods,
}

impl ProximityHandler for NearDestinationHandler {
    fn on_proximity_reached(&self, _threshold: &Proximity) {
        self.near_destination.store(true, Ordering::SeqCst);
        self.methods.refresh();
    }

    fn on_proximity_cancelled(&self) {
        self.near_destination.store(false, Ordering::SeqCst);
        self.methods.refresh();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{create_message_channel, Command, Message, MessageReceiver, MessageSender, SessionQueue};
    use crate::types::{Accuracy, ResolutionSet};

    struct FixedBattery(Option<f32>);

    impl BatteryLevelProvider for FixedBattery {
        fn battery_level(&self) -> Option<f32> {
            self.0
        }
    }

    fn default_resolution() -> Resolution {
        Resolution::new(Accuracy::Balanced, 100.0, 100.0)
    }

    fn create_policy(battery: Option<f32>) -> (DefaultResolutionPolicy, MessageSender, MessageReceiver) {
        let (sender, receiver) = create_message_channel();
        let methods = PolicyMethods::new(SessionQueue::new(&sender));
        let policy =
            DefaultResolutionPolicy::new(methods, default_resolution(), Arc::new(FixedBattery(battery)));
        (policy, sender, receiver)
    }

    fn quadrant_set() -> ResolutionSet {
        ResolutionSet {
            far_without_subscriber: Resolution::new(Accuracy::Low, 1.0, 2.0),
            far_with_subscriber: Resolution::new(Accuracy::Balanced, 3.0, 4.0),
            near_without_subscriber: Resolution::new(Accuracy::High, 5.0, 6.0),
            near_with_subscriber: Resolution::new(Accuracy::Maximum, 7.0, 8.0),
        }
    }

    fn constrained(resolutions: ResolutionSet, multiplier: f64) -> Trackable {
        Trackable::new("TestTrackableId").with_constraints(ResolutionConstraints {
            resolutions,
            proximity_threshold: Proximity::spatial(500.0),
            battery_level_threshold: 30.0,
            low_battery_multiplier: multiplier,
        })
    }

    fn request(trackable: &Trackable, remote_requests: Vec<Resolution>) -> ResolutionRequest {
        ResolutionRequest {
            trackable: trackable.clone(),
            remote_requests,
        }
    }

    fn mixed_requests() -> Vec<Resolution> {
        vec![
            Resolution::new(Accuracy::Minimum, 8.0, 5.0),
            Resolution::new(Accuracy::Low, 10.0, 3.0),
            Resolution::new(Accuracy::Balanced, 6.0, 7.0),
            Resolution::new(Accuracy::High, 4.0, 9.0),
            Resolution::new(Accuracy::Maximum, 10.0, 11.0),
        ]
    }

    /// Take the handler registered through `set_proximity_threshold`
    fn registered_handler(receiver: &mut MessageReceiver) -> Box<dyn ProximityHandler> {
        loop {
            match receiver.try_recv() {
                Ok(Message::Command(Command::SetProximityThreshold { handler, .. })) => return handler,
                Ok(_) => continue,
                Err(e) => panic!("no proximity threshold registered: {e}"),
            }
        }
    }

    #[test]
    fn test_no_requests_no_constraints_uses_default() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let trackable = Trackable::new("TestTrackableId");
        assert_eq!(policy.resolve(&request(&trackable, vec![])), default_resolution());
    }

    #[test]
    fn test_constraints_without_requests() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let resolution = Resolution::new(Accuracy::Balanced, 10.0, 11.0);
        let trackable = constrained(ResolutionSet::uniform(resolution), 3.0);
        assert_eq!(policy.resolve(&request(&trackable, vec![])), resolution);
    }

    #[test]
    fn test_low_battery_multiplies_interval() {
        let (mut policy, _sender, _receiver) = create_policy(Some(20.0));
        let trackable = constrained(
            ResolutionSet::uniform(Resolution::new(Accuracy::Balanced, 10.0, 10.0)),
            3.0,
        );
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            Resolution::new(Accuracy::Balanced, 30.0, 10.0)
        );
    }

    #[test]
    fn test_single_remote_request() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let remote = Resolution::new(Accuracy::Maximum, 12.0, 12.0);
        let trackable = Trackable::new("TestTrackableId");
        assert_eq!(policy.resolve(&request(&trackable, vec![remote])), remote);
    }

    #[test]
    fn test_multiple_remote_requests_merge() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let trackable = Trackable::new("TestTrackableId");
        assert_eq!(
            policy.resolve(&request(&trackable, mixed_requests())),
            Resolution::new(Accuracy::Maximum, 4.0, 3.0)
        );
    }

    #[test]
    fn test_constrained_requests_merge_with_constraint() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let trackable = constrained(
            ResolutionSet::uniform(Resolution::new(Accuracy::Balanced, 2.0, 5.0)),
            3.0,
        );
        assert_eq!(
            policy.resolve(&request(&trackable, mixed_requests())),
            Resolution::new(Accuracy::Maximum, 2.0, 3.0)
        );
    }

    #[test]
    fn test_constrained_requests_with_low_battery() {
        let (mut policy, _sender, _receiver) = create_policy(Some(10.0));
        let trackable = constrained(
            ResolutionSet::uniform(Resolution::new(Accuracy::Balanced, 2.0, 5.0)),
            20.0,
        );
        assert_eq!(
            policy.resolve(&request(&trackable, mixed_requests())),
            Resolution::new(Accuracy::Maximum, 40.0, 3.0)
        );
    }

    #[test]
    fn test_far_without_and_with_subscriber() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        let trackable = constrained(quadrant_set(), 20.0);
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().far_without_subscriber
        );

        let subscriber = Subscriber::new("SubscriberId", "TestTrackableId");
        policy.on_subscriber_added(&subscriber);
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().far_with_subscriber
        );

        policy.on_subscriber_removed(&subscriber);
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().far_without_subscriber
        );
    }

    #[test]
    fn test_near_without_subscriber_survives_active_cleared() {
        let (mut policy, _sender, mut receiver) = create_policy(None);
        let trackable = constrained(quadrant_set(), 20.0);

        policy.on_active_trackable_changed(Some(&trackable));
        let handler = registered_handler(&mut receiver);
        handler.on_proximity_reached(&Proximity::spatial(500.0));
        policy.on_active_trackable_changed(None);

        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().near_without_subscriber
        );
        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Command(Command::RefreshResolutionPolicy))
        ));
        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Command(Command::CancelProximityThreshold))
        ));
    }

    #[test]
    fn test_near_with_subscriber_and_cancellation() {
        let (mut policy, _sender, mut receiver) = create_policy(None);
        let trackable = constrained(quadrant_set(), 20.0);

        policy.on_subscriber_added(&Subscriber::new("SubscriberId", "TestTrackableId"));
        policy.on_active_trackable_changed(Some(&trackable));
        let handler = registered_handler(&mut receiver);
        handler.on_proximity_reached(&Proximity::spatial(500.0));
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().near_with_subscriber
        );

        handler.on_proximity_cancelled();
        assert_eq!(
            policy.resolve(&request(&trackable, vec![])),
            quadrant_set().far_with_subscriber
        );
    }

    #[test]
    fn test_resolve_all() {
        let (mut policy, _sender, _receiver) = create_policy(None);
        assert_eq!(policy.resolve_all(&[]), default_resolution());
        assert_eq!(
            policy.resolve_all(&mixed_requests()),
            Resolution::new(Accuracy::Maximum, 4.0, 3.0)
        );
    }
}
