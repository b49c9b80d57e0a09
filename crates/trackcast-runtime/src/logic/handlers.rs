//! Publisher Command, Event and Outcome Handlers
//!
//! Every handler mutates `PublisherState` synchronously and returns the effects
//! to execute plus the notifications for the delegate, in order. Completions are
//! resolved here or carried inside an effect until its outcome comes back.

use super::state::{EarlySignal, ProximityRegistration, PublisherState, SessionState};
use crate::managers::{FailureAction, LocationDeliveryState};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use trackcast_core::{
    ClientType, Completion, ConnectionState, DelegateEvent, DeliveryConfig, Effect,
    EnhancedLocationUpdate, Location, LocationUpdate, Outcome, PresenceAction, PresenceMessage,
    Proximity, ProximityHandler, PublisherError, PublisherResult, RawLocationUpdate,
    ResolutionRequest, Route, RoutingProfile, SessionQueue, Subscriber, ThresholdChecker,
    Trackable,
};

/// Effects to run and delegate notifications to post, in order
pub type Reaction = (Vec<Effect>, Vec<DelegateEvent>);

fn none() -> Reaction {
    (Vec::new(), Vec::new())
}

fn extend(reaction: &mut Reaction, other: Reaction) {
    reaction.0.extend(other.0);
    reaction.1.extend(other.1);
}

/// Delivery state for the trackable, created with a fresh generation if missing
fn delivery_for<'a, U: LocationUpdate>(
    deliveries: &'a mut HashMap<String, LocationDeliveryState<U>>,
    generation: &mut u64,
    trackable_id: &str,
    config: &DeliveryConfig,
) -> &'a mut LocationDeliveryState<U> {
    deliveries
        .entry(trackable_id.to_string())
        .or_insert_with(|| {
            *generation += 1;
            LocationDeliveryState::new(config, *generation)
        })
}

/// Command, event and outcome handlers for the publisher task
pub struct SessionHandlers;

impl SessionHandlers {
    // ---- Trackable Lifecycle ----

    /// Add the trackable if needed, then make it the active one
    pub fn handle_track(
        state: &mut PublisherState,
        trackable: Trackable,
        completion: Completion<()>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        if state.trackables.contains_key(&trackable.id) {
            return Self::handle_ready_to_track(state, trackable, completion);
        }

        let ready = Self::ready_to_track_completion(state.queue.clone(), trackable.clone(), completion);
        Self::begin_add(state, trackable, ready)
    }

    pub fn handle_add(
        state: &mut PublisherState,
        trackable: Trackable,
        completion: Completion<()>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        Self::begin_add(state, trackable, completion)
    }

    fn begin_add(
        state: &mut PublisherState,
        trackable: Trackable,
        completion: Completion<()>,
    ) -> Reaction {
        if state.trackables.contains_key(&trackable.id) {
            completion.succeed(());
            return none();
        }
        if state.duplicate_guard.is_in_flight(&trackable.id) {
            debug!(trackable_id = %trackable.id, "Connect already in flight, waiting for its result");
            state.duplicate_guard.save_completion(&trackable.id, completion);
            return none();
        }

        state.duplicate_guard.start_adding(&trackable.id);
        state.duplicate_guard.save_completion(&trackable.id, completion);
        let presence_data = state.presence_data();
        (
            vec![Effect::Connect {
                trackable,
                presence_data,
            }],
            Vec::new(),
        )
    }

    /// Completion that turns a successful add into the activation step of `track`
    fn ready_to_track_completion(
        queue: SessionQueue,
        trackable: Trackable,
        completion: Completion<()>,
    ) -> Completion<()> {
        Completion::inline(move |result| match result {
            Ok(()) => {
                let outcome = Outcome::TrackableReadyToTrack {
                    trackable,
                    completion,
                };
                if let Err(e) = queue.enqueue(outcome) {
                    warn!("Could not activate tracked trackable: {}", e);
                }
            }
            Err(e) => completion.fail(e),
        })
    }

    pub fn handle_connect_finished(
        state: &mut PublisherState,
        trackable: Trackable,
        result: PublisherResult<()>,
    ) -> Reaction {
        if state.is_stopped() {
            state.early_signals.remove(&trackable.id);
            state
                .duplicate_guard
                .finish_adding(&trackable.id, Err(PublisherError::PublisherStopped));
            return none();
        }
        if let Err(e) = result {
            warn!(trackable_id = %trackable.id, "Connect failed: {}", e);
            state.early_signals.remove(&trackable.id);
            state.duplicate_guard.finish_adding(&trackable.id, Err(e));
            return none();
        }

        // Listeners go in before the trackable joins the tracked set
        let trackable_id = trackable.id.clone();
        (
            vec![
                Effect::SubscribeForPresenceMessages {
                    trackable_id: trackable_id.clone(),
                },
                Effect::SubscribeForChannelState { trackable_id },
                Effect::Followup(Outcome::PresenceJoined { trackable }),
            ],
            Vec::new(),
        )
    }

    pub fn handle_presence_joined(state: &mut PublisherState, trackable: Trackable) -> Reaction {
        if state.is_stopped() {
            state.early_signals.remove(&trackable.id);
            state
                .duplicate_guard
                .finish_adding(&trackable.id, Err(PublisherError::PublisherStopped));
            return none();
        }

        state
            .trackables
            .insert(trackable.id.clone(), trackable.clone());
        state.policy.on_trackable_added(&trackable);

        let mut reaction = none();
        if !state.sensing {
            info!("Starting location sensing");
            state.sensing = true;
            reaction.0.push(Effect::StartUpdatingLocation);
            reaction.0.push(Effect::StartRecordingLocation);
        }
        extend(&mut reaction, Self::resolve(state, &trackable));
        reaction.1.push(DelegateEvent::TrackablesChanged {
            trackables: state.trackable_list(),
        });

        let early = state.early_signals.remove(&trackable.id).unwrap_or_default();
        if !early.is_empty() {
            debug!(trackable_id = %trackable.id, count = early.len(), "Replaying early signals");
        }
        for signal in early {
            let replayed = match signal {
                EarlySignal::Presence(message) => {
                    Self::handle_presence_message(state, trackable.id.clone(), message)
                }
                EarlySignal::Channel(connection_state) => Self::handle_channel_connection_changed(
                    state,
                    trackable.id.clone(),
                    connection_state,
                ),
            };
            extend(&mut reaction, replayed);
        }

        state.duplicate_guard.finish_adding(&trackable.id, Ok(()));
        reaction
    }

    pub fn handle_ready_to_track(
        state: &mut PublisherState,
        trackable: Trackable,
        completion: Completion<()>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        if !state.trackables.contains_key(&trackable.id) {
            debug!(trackable_id = %trackable.id, "Trackable removed before it could become active");
            completion.succeed(());
            return none();
        }
        if state.is_active(&trackable.id) {
            completion.succeed(());
            return none();
        }

        info!(trackable_id = %trackable.id, "Active trackable changed");
        state.active_trackable = Some(trackable.clone());
        state.route = None;
        state.policy.on_active_trackable_changed(Some(&trackable));

        match trackable.destination {
            Some(destination) => (
                vec![Effect::FetchRoute {
                    trackable_id: trackable.id,
                    destination,
                    profile: state.routing_profile,
                    completion,
                }],
                Vec::new(),
            ),
            None => {
                completion.succeed(());
                none()
            }
        }
    }

    pub fn handle_route_fetched(
        state: &mut PublisherState,
        trackable_id: String,
        profile: RoutingProfile,
        result: PublisherResult<Route>,
        completion: Completion<()>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        match result {
            Ok(route) => {
                state.routing_profile = profile;
                if state.is_active(&trackable_id) {
                    state.route = Some(route);
                }
                completion.succeed(());
            }
            Err(e) => {
                warn!(trackable_id = %trackable_id, "Route lookup failed: {}", e);
                completion.fail(PublisherError::invalid_destination(e.to_string()));
            }
        }
        none()
    }

    pub fn handle_change_routing_profile(
        state: &mut PublisherState,
        profile: RoutingProfile,
        completion: Completion<()>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        // Applied once the route lookup for it succeeds
        let destination = state
            .active_trackable
            .as_ref()
            .and_then(|active| active.destination.map(|d| (active.id.clone(), d)));
        match destination {
            Some((trackable_id, destination)) => (
                vec![Effect::FetchRoute {
                    trackable_id,
                    destination,
                    profile,
                    completion,
                }],
                Vec::new(),
            ),
            None => {
                state.routing_profile = profile;
                completion.succeed(());
                none()
            }
        }
    }

    pub fn handle_remove(
        state: &mut PublisherState,
        trackable: Trackable,
        completion: Completion<bool>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        let presence_data = state.presence_data();
        (
            vec![Effect::Disconnect {
                trackable,
                presence_data,
                completion,
            }],
            Vec::new(),
        )
    }

    pub fn handle_disconnect_finished(
        state: &mut PublisherState,
        trackable: Trackable,
        result: PublisherResult<bool>,
        completion: Completion<bool>,
    ) -> Reaction {
        if state.is_stopped() {
            completion.fail(PublisherError::PublisherStopped);
            return none();
        }
        match result {
            Err(e) => {
                completion.fail(e);
                none()
            }
            Ok(false) => {
                completion.succeed(false);
                none()
            }
            Ok(true) => {
                let reaction = Self::forget_trackable(state, &trackable);
                completion.succeed(true);
                reaction
            }
        }
    }

    fn forget_trackable(state: &mut PublisherState, trackable: &Trackable) -> Reaction {
        info!(trackable_id = %trackable.id, "Trackable removed");
        state.trackables.remove(&trackable.id);
        for subscriber in state.resolutions.remove_trackable(&trackable.id) {
            state.policy.on_subscriber_removed(&subscriber);
        }
        state.enhanced_delivery.remove(&trackable.id);
        state.raw_delivery.remove(&trackable.id);
        state.connections.remove_trackable(&trackable.id);
        state.policy.on_trackable_removed(trackable);

        if state.is_active(&trackable.id) {
            state.active_trackable = None;
            state.route = None;
            state.policy.on_active_trackable_changed(None);
        }

        let mut reaction = none();
        if state.trackables.is_empty() && state.sensing {
            info!("Stopping location sensing, no trackables left");
            state.sensing = false;
            reaction.0.push(Effect::StopUpdatingLocation);
            reaction.0.push(Effect::StopRecordingLocation);
        }
        extend(&mut reaction, Self::resolve_engine(state));
        reaction.1.push(DelegateEvent::TrackablesChanged {
            trackables: state.trackable_list(),
        });
        reaction
    }

    // ---- Stop ----

    pub fn handle_stop(state: &mut PublisherState, completion: Completion<()>) -> Reaction {
        match state.session {
            SessionState::Stopped => {
                completion.succeed(());
                none()
            }
            SessionState::Stopping => {
                state.stop_completions.push(completion);
                none()
            }
            _ => {
                info!("Publisher stopping");
                state.session = SessionState::Stopping;
                state.stop_completions.push(completion);
                let presence_data = state.presence_data();
                (vec![Effect::Close { presence_data }], Vec::new())
            }
        }
    }

    pub fn handle_close_finished(state: &mut PublisherState, result: PublisherResult<()>) -> Reaction {
        if let Err(e) = &result {
            warn!("Transport close failed: {}", e);
        }
        info!("Publisher stopped");
        state.session = SessionState::Stopped;
        state.clear();

        for completion in state.stop_completions.drain(..) {
            completion.complete(result.clone());
        }
        (
            vec![Effect::StopUpdatingLocation, Effect::StopRecordingLocation],
            Vec::new(),
        )
    }

    // ---- Queries ----

    pub fn handle_get_active_trackable(
        state: &PublisherState,
        completion: Completion<Option<Trackable>>,
    ) -> Reaction {
        completion.succeed(state.active_trackable.clone());
        none()
    }

    pub fn handle_get_routing_profile(
        state: &PublisherState,
        completion: Completion<RoutingProfile>,
    ) -> Reaction {
        completion.succeed(state.routing_profile);
        none()
    }

    // ---- Resolution ----

    /// Re-resolve one trackable, then the engine resolution
    fn resolve(state: &mut PublisherState, trackable: &Trackable) -> Reaction {
        let request = ResolutionRequest {
            trackable: trackable.clone(),
            remote_requests: state.resolutions.remote_requests(&trackable.id),
        };
        let resolution = state.policy.resolve(&request);
        state.resolutions.set_resolution(&trackable.id, resolution);
        debug!(trackable_id = %trackable.id, ?resolution, "Resolved trackable resolution");

        let mut reaction = none();
        if state.config.resolution.send_resolution_enabled {
            reaction.0.push(Effect::UpdatePresenceData {
                trackable_id: trackable.id.clone(),
                presence_data: state.presence_data().with_resolution(resolution),
            });
        }
        extend(&mut reaction, Self::resolve_engine(state));
        reaction
    }

    fn resolve_engine(state: &mut PublisherState) -> Reaction {
        match state.config.resolution.constant_engine_resolution {
            Some(constant) => {
                state.engine_resolution = Some(constant);
                (
                    Vec::new(),
                    vec![DelegateEvent::ResolutionChanged {
                        resolution: constant,
                    }],
                )
            }
            None => {
                let resolution = state.policy.resolve_all(&state.resolutions.resolutions());
                state.engine_resolution = Some(resolution);
                (
                    vec![Effect::ChangeEngineResolution { resolution }],
                    vec![DelegateEvent::ResolutionChanged { resolution }],
                )
            }
        }
    }

    pub fn handle_refresh_resolution_policy(state: &mut PublisherState) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let mut reaction = none();
        for trackable in state.trackable_list() {
            extend(&mut reaction, Self::resolve(state, &trackable));
        }
        reaction
    }

    pub fn handle_presence_message(
        state: &mut PublisherState,
        trackable_id: String,
        message: PresenceMessage,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let Some(trackable) = state.trackables.get(&trackable_id).cloned() else {
            if state.duplicate_guard.is_in_flight(&trackable_id) {
                state
                    .early_signals
                    .entry(trackable_id)
                    .or_default()
                    .push(EarlySignal::Presence(message));
            } else {
                debug!(trackable_id = %trackable_id, "Presence for unknown trackable ignored");
            }
            return none();
        };
        if message.data.client_type != ClientType::Subscriber {
            return none();
        }

        let requested = message.data.resolution;
        let changed = match message.action {
            PresenceAction::Present | PresenceAction::Enter => {
                let subscriber = Subscriber::new(message.client_id, trackable_id);
                if state.resolutions.add_subscriber(subscriber.clone(), requested) {
                    state.policy.on_subscriber_added(&subscriber);
                }
                true
            }
            PresenceAction::Leave | PresenceAction::Absent => {
                match state
                    .resolutions
                    .remove_subscriber(&trackable_id, &message.client_id)
                {
                    Some(subscriber) => {
                        state.policy.on_subscriber_removed(&subscriber);
                        true
                    }
                    None => false,
                }
            }
            PresenceAction::Update => state
                .resolutions
                .update_subscriber(&trackable_id, &message.client_id, requested)
                .is_some(),
        };

        if changed {
            Self::resolve(state, &trackable)
        } else {
            none()
        }
    }

    // ---- Proximity ----

    pub fn handle_set_proximity_threshold(
        state: &mut PublisherState,
        threshold: Proximity,
        handler: Box<dyn ProximityHandler>,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let previous = state
            .proximity
            .replace(ProximityRegistration { threshold, handler });
        match previous {
            Some(previous) => {
                previous.handler.on_proximity_cancelled();
                (Vec::new(), vec![DelegateEvent::ProximityCancelled])
            }
            None => none(),
        }
    }

    pub fn handle_cancel_proximity_threshold(state: &mut PublisherState) -> Reaction {
        match state.proximity.take() {
            Some(registration) => {
                registration.handler.on_proximity_cancelled();
                (Vec::new(), vec![DelegateEvent::ProximityCancelled])
            }
            None => none(),
        }
    }

    /// Fire the registered threshold at most once
    fn check_proximity(state: &mut PublisherState, location: &Location) -> Vec<DelegateEvent> {
        let Some(registration) = &state.proximity else {
            return Vec::new();
        };
        let now = state.time_source.now();
        let destination = state
            .active_trackable
            .as_ref()
            .and_then(|active| active.destination);
        let estimated_arrival = state.route.map(|route| now + route.expected_travel_time);

        let reached = ThresholdChecker.is_threshold_reached(
            &registration.threshold,
            location,
            now,
            destination.as_ref(),
            estimated_arrival,
        );
        if !reached {
            return Vec::new();
        }

        match state.proximity.take() {
            Some(registration) => {
                registration
                    .handler
                    .on_proximity_reached(&registration.threshold);
                vec![DelegateEvent::ProximityReached {
                    threshold: registration.threshold,
                }]
            }
            None => Vec::new(),
        }
    }

    // ---- Locations ----

    pub fn handle_enhanced_location(
        state: &mut PublisherState,
        update: EnhancedLocationUpdate,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let mut reaction = (
            Vec::new(),
            vec![DelegateEvent::EnhancedLocationChanged {
                update: update.clone(),
            }],
        );

        let config = state.config.delivery.clone();
        let ids: Vec<String> = state.trackables.keys().cloned().collect();
        for trackable_id in ids {
            let resolution = state.resolutions.resolution(&trackable_id).copied();
            let delivery = delivery_for(
                &mut state.enhanced_delivery,
                &mut state.delivery_generation,
                &trackable_id,
                &config,
            );
            if !delivery.should_send(&update.location, resolution.as_ref()) {
                continue;
            }
            if let Some(ready) = delivery.offer(update.clone()) {
                reaction.0.push(Effect::SendEnhancedLocation {
                    trackable_id,
                    generation: delivery.generation(),
                    update: ready,
                });
            }
        }

        reaction
            .1
            .extend(Self::check_proximity(state, &update.location));
        reaction
    }

    pub fn handle_raw_location(state: &mut PublisherState, update: RawLocationUpdate) -> Reaction {
        if state.is_stopped() || !state.config.raw_locations_enabled {
            return none();
        }
        let mut reaction = none();

        let config = state.config.delivery.clone();
        let ids: Vec<String> = state.trackables.keys().cloned().collect();
        for trackable_id in ids {
            let resolution = state.resolutions.resolution(&trackable_id).copied();
            let delivery = delivery_for(
                &mut state.raw_delivery,
                &mut state.delivery_generation,
                &trackable_id,
                &config,
            );
            if !delivery.should_send(&update.location, resolution.as_ref()) {
                continue;
            }
            if let Some(ready) = delivery.offer(update.clone()) {
                reaction.0.push(Effect::SendRawLocation {
                    trackable_id,
                    generation: delivery.generation(),
                    update: ready,
                });
            }
        }

        reaction
            .1
            .extend(Self::check_proximity(state, &update.location));
        reaction
    }

    /// Apply a send result; results of sends issued before a re-add are ignored
    pub fn handle_enhanced_send_finished(
        state: &mut PublisherState,
        trackable_id: String,
        generation: u64,
        result: PublisherResult<()>,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let Some(delivery) = state
            .enhanced_delivery
            .get_mut(&trackable_id)
            .filter(|delivery| delivery.generation() == generation)
        else {
            debug!(trackable_id = %trackable_id, generation, "Stale enhanced send result ignored");
            return none();
        };

        let mut reaction = none();
        match result {
            Ok(()) => {
                state.stats.locations_sent += 1;
                if let Some(next) = delivery.on_success() {
                    reaction.0.push(Effect::SendEnhancedLocation {
                        trackable_id: trackable_id.clone(),
                        generation,
                        update: next,
                    });
                }
                if let Some(logical) = state.connections.mark_location_sent(&trackable_id) {
                    if let Some(trackable) = state.trackables.get(&trackable_id) {
                        reaction.1.push(DelegateEvent::ConnectionStateChanged {
                            trackable: trackable.clone(),
                            state: logical,
                        });
                    }
                }
            }
            Err(error) => match delivery.on_failure() {
                Some(FailureAction::Retry(update)) => {
                    debug!(trackable_id = %trackable_id, "Retrying enhanced location send");
                    state.stats.send_retries += 1;
                    reaction.0.push(Effect::SendEnhancedLocation {
                        trackable_id,
                        generation,
                        update,
                    });
                }
                Some(FailureAction::GiveUp { next }) => {
                    warn!(trackable_id = %trackable_id, "Enhanced location skipped: {}", error);
                    state.stats.locations_skipped += 1;
                    reaction.1.push(DelegateEvent::Error { error });
                    if let Some(update) = next {
                        reaction.0.push(Effect::SendEnhancedLocation {
                            trackable_id,
                            generation,
                            update,
                        });
                    }
                }
                None => {}
            },
        }
        reaction
    }

    pub fn handle_raw_send_finished(
        state: &mut PublisherState,
        trackable_id: String,
        generation: u64,
        result: PublisherResult<()>,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let Some(delivery) = state
            .raw_delivery
            .get_mut(&trackable_id)
            .filter(|delivery| delivery.generation() == generation)
        else {
            debug!(trackable_id = %trackable_id, generation, "Stale raw send result ignored");
            return none();
        };

        let mut reaction = none();
        match result {
            Ok(()) => {
                state.stats.locations_sent += 1;
                if let Some(next) = delivery.on_success() {
                    reaction.0.push(Effect::SendRawLocation {
                        trackable_id,
                        generation,
                        update: next,
                    });
                }
            }
            Err(error) => match delivery.on_failure() {
                Some(FailureAction::Retry(update)) => {
                    state.stats.send_retries += 1;
                    reaction.0.push(Effect::SendRawLocation {
                        trackable_id,
                        generation,
                        update,
                    });
                }
                Some(FailureAction::GiveUp { next }) => {
                    warn!(trackable_id = %trackable_id, "Raw location skipped: {}", error);
                    state.stats.locations_skipped += 1;
                    reaction.1.push(DelegateEvent::Error { error });
                    if let Some(update) = next {
                        reaction.0.push(Effect::SendRawLocation {
                            trackable_id,
                            generation,
                            update,
                        });
                    }
                }
                None => {}
            },
        }
        reaction
    }

    // ---- Collaborator Errors ----

    pub fn handle_collaborator_error(state: &mut PublisherState, error: PublisherError) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        warn!("Collaborator reported an error: {}", error);
        (Vec::new(), vec![DelegateEvent::Error { error }])
    }

    // ---- Connectivity ----

    pub fn handle_client_connection_changed(
        state: &mut PublisherState,
        connection_state: ConnectionState,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let changes = state
            .connections
            .update_client_state(connection_state, state.trackables.keys());
        let events = changes
            .into_iter()
            .filter_map(|(trackable_id, logical)| {
                state
                    .trackables
                    .get(&trackable_id)
                    .map(|trackable| DelegateEvent::ConnectionStateChanged {
                        trackable: trackable.clone(),
                        state: logical,
                    })
            })
            .collect();
        (Vec::new(), events)
    }

    pub fn handle_channel_connection_changed(
        state: &mut PublisherState,
        trackable_id: String,
        connection_state: ConnectionState,
    ) -> Reaction {
        if state.is_stopped() {
            return none();
        }
        let Some(trackable) = state.trackables.get(&trackable_id) else {
            if state.duplicate_guard.is_in_flight(&trackable_id) {
                state
                    .early_signals
                    .entry(trackable_id)
                    .or_default()
                    .push(EarlySignal::Channel(connection_state));
            }
            return none();
        };
        match state
            .connections
            .update_channel_state(&trackable_id, connection_state)
        {
            Some(logical) => (
                Vec::new(),
                vec![DelegateEvent::ConnectionStateChanged {
                    trackable: trackable.clone(),
                    state: logical,
                }],
            ),
            None => none(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
