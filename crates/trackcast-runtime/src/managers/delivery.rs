//! Location delivery tracking for the publisher runtime
//!
//! One `LocationDeliveryState` exists per trackable and stream (raw or enhanced).
//! It allows a single send in flight, queues later updates in arrival order,
//! retries a failed send a bounded number of times and remembers locations that
//! could not be delivered so they ride along with the next send.

use std::collections::VecDeque;
use trackcast_core::{DeliveryConfig, Location, LocationUpdate, Resolution, SkippedLocations};

// ----------------------------------------------------------------------------
// Delivery Outcomes
// ----------------------------------------------------------------------------

/// What to do after a send failed
#[derive(Debug, Clone, PartialEq)]
pub enum FailureAction<U> {
    /// Resend the same update
    Retry(U),
    /// Retries are exhausted; the location went to the skip buffer
    GiveUp {
        /// Next queued update to send, already prepared
        next: Option<U>,
    },
}

// ----------------------------------------------------------------------------
// Location Delivery State
// ----------------------------------------------------------------------------

/// Pending/waiting/retry/skip bookkeeping for one trackable and stream
#[derive(Debug)]
pub struct LocationDeliveryState<U: LocationUpdate> {
    /// Session-unique id; outcomes of sends issued by an earlier state for the
    /// same trackable carry a different one
    generation: u64,
    max_retry_count: u32,
    /// Update currently being sent, if any
    in_flight: Option<U>,
    waiting: VecDeque<U>,
    retry_count: u32,
    skipped: SkippedLocations,
    last_sent: Option<Location>,
}

impl<U: LocationUpdate> LocationDeliveryState<U> {
    pub fn new(config: &DeliveryConfig, generation: u64) -> Self {
        Self {
            generation,
            max_retry_count: config.max_retry_count,
            in_flight: None,
            waiting: VecDeque::new(),
            retry_count: 0,
            skipped: SkippedLocations::new(config.max_skipped_locations),
            last_sent: None,
        }
    }

    /// Admission filter against the last location handed to the transport
    ///
    /// Without a previous location or a resolution every location passes.
    pub fn should_send(&self, location: &Location, resolution: Option<&Resolution>) -> bool {
        let (Some(last), Some(resolution)) = (self.last_sent.as_ref(), resolution) else {
            return true;
        };
        let distance = location.distance_to(last);
        let elapsed_seconds = location.timestamp.seconds_since(last.timestamp);
        distance >= resolution.minimum_displacement
            || elapsed_seconds >= resolution.desired_interval / 1000.0
    }

    /// Accept an update; returns it prepared for sending if nothing is in flight
    pub fn offer(&mut self, update: U) -> Option<U> {
        if self.is_pending() {
            self.waiting.push_back(update);
            None
        } else {
            Some(self.begin_send(update))
        }
    }

    /// The in-flight send succeeded; returns the next update to send
    pub fn on_success(&mut self) -> Option<U> {
        self.in_flight = None;
        self.retry_count = 0;
        self.next_waiting()
    }

    /// The in-flight send failed
    ///
    /// Returns `None` when no send was outstanding.
    pub fn on_failure(&mut self) -> Option<FailureAction<U>> {
        if self.retry_count < self.max_retry_count {
            let update = self.in_flight.clone()?;
            self.retry_count += 1;
            return Some(FailureAction::Retry(update));
        }

        let failed = self.in_flight.take()?;
        // Locations attached to the failed update go back ahead of it
        for location in failed.skipped_locations() {
            self.skipped.push(*location);
        }
        self.skipped.push(*failed.location());
        Some(FailureAction::GiveUp {
            next: self.next_waiting(),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn skipped(&self) -> &SkippedLocations {
        &self.skipped
    }

    pub fn last_sent(&self) -> Option<&Location> {
        self.last_sent.as_ref()
    }

    fn next_waiting(&mut self) -> Option<U> {
        let next = self.waiting.pop_front()?;
        Some(self.begin_send(next))
    }

    fn begin_send(&mut self, mut update: U) -> U {
        update.set_skipped_locations(self.skipped.drain());
        self.last_sent = Some(*update.location());
        self.in_flight = Some(update.clone());
        update
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use trackcast_core::{Accuracy, RawLocationUpdate, Timestamp};

    fn create_test_location(latitude: f64, longitude: f64, millis: u64) -> Location {
        Location::new(latitude, longitude, Timestamp::new(millis))
    }

    fn update(latitude: f64) -> RawLocationUpdate {
        RawLocationUpdate::new(create_test_location(latitude, 0.0, 0))
    }

    fn state() -> LocationDeliveryState<RawLocationUpdate> {
        LocationDeliveryState::new(&DeliveryConfig::default(), 1)
    }

    #[test]
    fn test_filter_uses_displacement_and_interval() {
        let mut delivery = state();
        let resolution = Resolution::new(Accuracy::Balanced, 500.0, 500.0);
        let a = create_test_location(51.50084974160386, -0.12460883599692132, 1_000);
        let b = create_test_location(51.50106028620921, -0.12455871010105721, 1_000);
        let c = create_test_location(51.50076810088975, -0.11582583421022277, 1_000);

        assert!(delivery.should_send(&a, Some(&resolution)));
        delivery.offer(RawLocationUpdate::new(a));
        assert_eq!(delivery.last_sent(), Some(&a));

        assert!(!delivery.should_send(&b, Some(&resolution)));
        assert!(delivery.should_send(&c, Some(&resolution)));

        let b_later = Location {
            timestamp: Timestamp::new(1_500),
            ..b
        };
        assert!(delivery.should_send(&b_later, Some(&resolution)));
        assert!(delivery.should_send(&b, None));
    }

    #[test]
    fn test_waiting_updates_keep_order() {
        let mut delivery = state();
        assert!(delivery.offer(update(1.0)).is_some());
        assert!(delivery.offer(update(2.0)).is_none());
        assert!(delivery.offer(update(3.0)).is_none());
        assert_eq!(delivery.waiting_len(), 2);

        let next = delivery.on_success().unwrap();
        assert_eq!(next.location.coordinate.latitude, 2.0);
        let next = delivery.on_success().unwrap();
        assert_eq!(next.location.coordinate.latitude, 3.0);
        assert!(delivery.on_success().is_none());
        assert!(!delivery.is_pending());
    }

    #[test]
    fn test_single_retry_then_skip() {
        let mut delivery = state();
        delivery.offer(update(1.0));

        match delivery.on_failure() {
            Some(FailureAction::Retry(retry)) => assert_eq!(retry.location.coordinate.latitude, 1.0),
            other => panic!("expected retry, got {other:?}"),
        }
        assert!(delivery.is_pending());

        assert_eq!(delivery.on_failure(), Some(FailureAction::GiveUp { next: None }));
        assert!(!delivery.is_pending());
        // A skipped location still counts as the last one handed to the transport
        assert_eq!(
            delivery.last_sent().map(|l| l.coordinate.latitude),
            Some(1.0)
        );
        assert_eq!(delivery.skipped().len(), 1);

        let sent = delivery.offer(update(2.0)).unwrap();
        assert_eq!(sent.skipped_locations.len(), 1);
        assert_eq!(sent.skipped_locations[0].coordinate.latitude, 1.0);
        assert!(delivery.skipped().is_empty());
    }

    #[test]
    fn test_retry_counter_resets_only_on_success() {
        let mut delivery = state();
        delivery.offer(update(1.0));
        delivery.on_failure();
        delivery.on_failure();
        assert_eq!(delivery.retry_count(), 1);

        // Exhausted counter carries over: the next failure is skipped at once
        delivery.offer(update(2.0));
        assert!(matches!(delivery.on_failure(), Some(FailureAction::GiveUp { .. })));
        assert_eq!(delivery.skipped().len(), 2);

        let sent = delivery.offer(update(3.0)).unwrap();
        let latitudes: Vec<f64> = sent
            .skipped_locations
            .iter()
            .map(|l| l.coordinate.latitude)
            .collect();
        assert_eq!(latitudes, vec![1.0, 2.0]);
        assert!(delivery.on_success().is_none());
        assert_eq!(delivery.retry_count(), 0);
    }

    #[test]
    fn test_give_up_moves_to_next_waiting() {
        let mut delivery = state();
        delivery.offer(update(1.0));
        delivery.offer(update(2.0));
        delivery.on_failure();

        match delivery.on_failure() {
            Some(FailureAction::GiveUp { next: Some(next) }) => {
                assert_eq!(next.location.coordinate.latitude, 2.0);
                assert_eq!(next.skipped_locations.len(), 1);
            }
            other => panic!("expected give up with next update, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_without_send_is_ignored() {
        let mut delivery = LocationDeliveryState::<RawLocationUpdate>::new(&DeliveryConfig {
            max_retry_count: 0,
            max_skipped_locations: 2,
        }, 1);
        assert_eq!(delivery.on_failure(), None);
    }
}
