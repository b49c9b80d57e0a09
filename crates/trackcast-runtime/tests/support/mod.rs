//! Recording mock collaborators shared by the runtime integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use trackcast_core::{
    ConnectionState, EnhancedLocationUpdate, EventSender, Location, LocationCoordinate,
    LocationSource, PresenceData, PresenceMessage, Proximity, PublisherDelegate, PublisherError, PublisherResult,
    RawLocationUpdate, Resolution, Route, RouteProvider, RoutingProfile, Timestamp, Trackable,
    Transport,
};

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

/// Poll until the condition holds, failing the test after five seconds
pub async fn wait_until<F: FnMut() -> bool>(description: &str, mut condition: F) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {description}");
}

/// Let queued messages drain when asserting that nothing else happens
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub fn create_test_location(latitude: f64, longitude: f64, millis: u64) -> Location {
    Location::new(latitude, longitude, Timestamp::new(millis))
}

pub fn enhanced(latitude: f64, millis: u64) -> EnhancedLocationUpdate {
    EnhancedLocationUpdate::new(create_test_location(latitude, 0.0, millis))
}

// ----------------------------------------------------------------------------
// Mock Transport
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Connect(String),
    Disconnect(String),
    SubscribePresence(String),
    SubscribeChannelState(String),
    SendEnhanced(String, EnhancedLocationUpdate),
    SendRaw(String, RawLocationUpdate),
    UpdatePresence(String, PresenceData),
    Close,
}

#[derive(Default)]
struct TransportInner {
    calls: Mutex<Vec<TransportCall>>,
    events: Mutex<Option<EventSender>>,
    connected: Mutex<HashSet<String>>,
    connect_gate: Option<Semaphore>,
    connect_error: Mutex<Option<PublisherError>>,
    send_results: Mutex<VecDeque<PublisherResult<()>>>,
    presence_on_subscribe: Mutex<Option<PresenceMessage>>,
    channel_state_on_subscribe: Mutex<Option<ConnectionState>>,
    sends_in_flight: AtomicUsize,
    max_sends_in_flight: AtomicUsize,
}

/// Transport that records every call; clones share the same record
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<TransportInner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects block until `release_connect` is called
    pub fn gated() -> Self {
        Self {
            inner: Arc::new(TransportInner {
                connect_gate: Some(Semaphore::new(0)),
                ..TransportInner::default()
            }),
        }
    }

    pub fn release_connect(&self) {
        if let Some(gate) = &self.inner.connect_gate {
            gate.add_permits(1_000);
        }
    }

    pub fn fail_connect(&self, error: PublisherError) {
        *self.inner.connect_error.lock().unwrap() = Some(error);
    }

    /// Results for the next sends, oldest first; later sends succeed
    pub fn script_sends<I: IntoIterator<Item = PublisherResult<()>>>(&self, results: I) {
        self.inner.send_results.lock().unwrap().extend(results);
    }

    /// Emit this presence message from inside the next presence subscription
    pub fn announce_on_subscribe(&self, message: PresenceMessage) {
        *self.inner.presence_on_subscribe.lock().unwrap() = Some(message);
    }

    /// Emit this channel state from inside the next channel state subscription
    pub fn channel_state_on_subscribe(&self, state: ConnectionState) {
        *self.inner.channel_state_on_subscribe.lock().unwrap() = Some(state);
    }

    pub fn events(&self) -> EventSender {
        self.inner
            .events
            .lock()
            .unwrap()
            .clone()
            .expect("transport events not attached")
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Connect(_)))
            .count()
    }

    pub fn enhanced_sends(&self) -> Vec<EnhancedLocationUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::SendEnhanced(_, update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn max_sends_in_flight(&self) -> usize {
        self.inner.max_sends_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: TransportCall) {
        self.inner.calls.lock().unwrap().push(call);
    }

    async fn send(&self, call: TransportCall) -> PublisherResult<()> {
        self.record(call);
        let in_flight = self.inner.sends_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .max_sends_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let result = self
            .inner
            .send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        self.inner.sends_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn attach_events(&mut self, events: EventSender) {
        *self.inner.events.lock().unwrap() = Some(events);
    }

    async fn connect(&self, trackable_id: &str, _presence_data: PresenceData) -> PublisherResult<()> {
        self.record(TransportCall::Connect(trackable_id.to_string()));
        if let Some(gate) = &self.inner.connect_gate {
            let _permit = gate.acquire().await;
        }
        if let Some(error) = self.inner.connect_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.inner
            .connected
            .lock()
            .unwrap()
            .insert(trackable_id.to_string());
        Ok(())
    }

    async fn disconnect(
        &self,
        trackable_id: &str,
        _presence_data: PresenceData,
    ) -> PublisherResult<bool> {
        self.record(TransportCall::Disconnect(trackable_id.to_string()));
        Ok(self.inner.connected.lock().unwrap().remove(trackable_id))
    }

    fn subscribe_for_presence_messages(&self, trackable_id: &str) -> PublisherResult<()> {
        self.record(TransportCall::SubscribePresence(trackable_id.to_string()));
        if let Some(message) = self.inner.presence_on_subscribe.lock().unwrap().take() {
            self.events().presence_message(trackable_id, message)?;
        }
        Ok(())
    }

    fn subscribe_for_channel_state(&self, trackable_id: &str) -> PublisherResult<()> {
        self.record(TransportCall::SubscribeChannelState(trackable_id.to_string()));
        if let Some(state) = self.inner.channel_state_on_subscribe.lock().unwrap().take() {
            self.events().channel_connection_changed(trackable_id, state)?;
        }
        Ok(())
    }

    async fn send_enhanced_location(
        &self,
        trackable_id: &str,
        update: EnhancedLocationUpdate,
    ) -> PublisherResult<()> {
        self.send(TransportCall::SendEnhanced(trackable_id.to_string(), update))
            .await
    }

    async fn send_raw_location(
        &self,
        trackable_id: &str,
        update: RawLocationUpdate,
    ) -> PublisherResult<()> {
        self.send(TransportCall::SendRaw(trackable_id.to_string(), update))
            .await
    }

    async fn update_presence_data(
        &self,
        trackable_id: &str,
        presence_data: PresenceData,
    ) -> PublisherResult<()> {
        self.record(TransportCall::UpdatePresence(
            trackable_id.to_string(),
            presence_data,
        ));
        Ok(())
    }

    async fn close(&self, _presence_data: PresenceData) -> PublisherResult<()> {
        self.record(TransportCall::Close);
        self.inner.connected.lock().unwrap().clear();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Mock Location Source
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LocationCall {
    StartUpdating,
    StopUpdating,
    StartRecording,
    StopRecording,
    ChangeResolution(Resolution),
}

#[derive(Default)]
struct LocationInner {
    calls: Mutex<Vec<LocationCall>>,
    events: Mutex<Option<EventSender>>,
}

#[derive(Clone, Default)]
pub struct MockLocationSource {
    inner: Arc<LocationInner>,
}

impl MockLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> EventSender {
        self.inner
            .events
            .lock()
            .unwrap()
            .clone()
            .expect("location events not attached")
    }

    pub fn calls(&self) -> Vec<LocationCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn resolutions(&self) -> Vec<Resolution> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LocationCall::ChangeResolution(resolution) => Some(resolution),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: LocationCall) {
        self.inner.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LocationSource for MockLocationSource {
    fn attach_events(&mut self, events: EventSender) {
        *self.inner.events.lock().unwrap() = Some(events);
    }

    fn start_updating(&self) {
        self.record(LocationCall::StartUpdating);
    }

    fn stop_updating(&self) {
        self.record(LocationCall::StopUpdating);
    }

    fn start_recording(&self) {
        self.record(LocationCall::StartRecording);
    }

    async fn stop_recording(&self) -> PublisherResult<()> {
        self.record(LocationCall::StopRecording);
        Ok(())
    }

    fn change_resolution(&self, resolution: &Resolution) {
        self.record(LocationCall::ChangeResolution(*resolution));
    }
}

// ----------------------------------------------------------------------------
// Mock Route Provider
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockRouteProvider {
    result: PublisherResult<Route>,
    requests: Arc<Mutex<Vec<(LocationCoordinate, RoutingProfile)>>>,
}

impl MockRouteProvider {
    pub fn new(expected_travel_time: Duration) -> Self {
        Self {
            result: Ok(Route {
                expected_travel_time,
                distance: 1_000.0,
            }),
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(PublisherError::transport("no route")),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<(LocationCoordinate, RoutingProfile)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteProvider for MockRouteProvider {
    async fn get_route(
        &self,
        destination: LocationCoordinate,
        profile: RoutingProfile,
    ) -> PublisherResult<Route> {
        self.requests.lock().unwrap().push((destination, profile));
        self.result.clone()
    }
}

// ----------------------------------------------------------------------------
// Recording Delegate
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DelegateRecord {
    Error(PublisherError),
    ConnectionState(String, ConnectionState),
    EnhancedLocation,
    Resolution(Resolution),
    Trackables(Vec<String>),
    ProximityReached,
    ProximityCancelled,
}

#[derive(Default)]
pub struct RecordingDelegate {
    records: Mutex<Vec<DelegateRecord>>,
}

impl RecordingDelegate {
    pub fn records(&self) -> Vec<DelegateRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<PublisherError> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                DelegateRecord::Error(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn connection_states(&self, trackable_id: &str) -> Vec<ConnectionState> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                DelegateRecord::ConnectionState(id, state) if id == trackable_id => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, expected: &DelegateRecord) -> bool {
        self.records().contains(expected)
    }

    fn record(&self, record: DelegateRecord) {
        self.records.lock().unwrap().push(record);
    }
}

impl PublisherDelegate for RecordingDelegate {
    fn on_error(&self, error: &PublisherError) {
        self.record(DelegateRecord::Error(error.clone()));
    }

    fn on_connection_state_changed(&self, trackable: &Trackable, state: ConnectionState) {
        self.record(DelegateRecord::ConnectionState(trackable.id.clone(), state));
    }

    fn on_enhanced_location_changed(&self, _update: &EnhancedLocationUpdate) {
        self.record(DelegateRecord::EnhancedLocation);
    }

    fn on_resolution_changed(&self, resolution: &Resolution) {
        self.record(DelegateRecord::Resolution(*resolution));
    }

    fn on_trackables_changed(&self, trackables: &[Trackable]) {
        self.record(DelegateRecord::Trackables(
            trackables.iter().map(|t| t.id.clone()).collect(),
        ));
    }

    fn on_proximity_reached(&self, _threshold: &Proximity) {
        self.record(DelegateRecord::ProximityReached);
    }

    fn on_proximity_cancelled(&self) {
        self.record(DelegateRecord::ProximityCancelled);
    }
}
