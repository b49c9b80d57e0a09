//! Publisher Task Implementation
//!
//! Contains the `PublisherTask` loop that drains the session queue one message
//! at a time.

use super::handlers::{Reaction, SessionHandlers};
use super::state::{PublisherState, PublisherStats};
use crate::executor::EffectExecutor;
use tracing::{info, trace, warn};
use trackcast_core::channel::{ForegroundSender, MessageReceiver};
use trackcast_core::{Command, DelegateEvent, Event, ForegroundJob, Message, Outcome};

// ----------------------------------------------------------------------------
// Publisher Task
// ----------------------------------------------------------------------------

/// The task that owns the session state and processes every message
pub struct PublisherTask {
    state: PublisherState,
    receiver: MessageReceiver,
    executor: EffectExecutor,
    foreground: ForegroundSender,
}

impl PublisherTask {
    pub fn new(
        state: PublisherState,
        receiver: MessageReceiver,
        executor: EffectExecutor,
        foreground: ForegroundSender,
    ) -> Self {
        Self {
            state,
            receiver,
            executor,
            foreground,
        }
    }

    /// Run until the last publisher handle is dropped
    pub async fn run(mut self) -> PublisherStats {
        info!("Publisher task starting");
        while let Some(message) = self.receiver.recv().await {
            self.process(message);
        }
        info!(
            session = ?self.state.session,
            stats = ?self.state.stats,
            "Publisher queue closed, task exiting"
        );
        self.state.stats
    }

    /// Apply one message, then issue its effects and notifications in order
    pub fn process(&mut self, message: Message) {
        let (effects, events) = match message {
            Message::Command(command) => {
                self.state.stats.commands_processed += 1;
                trace!(command = command.name(), "Processing command");
                self.process_command(command)
            }
            Message::Event(event) => {
                self.state.stats.events_processed += 1;
                trace!(?event, "Processing event");
                self.process_event(event)
            }
            Message::Outcome(outcome) => {
                self.state.stats.outcomes_processed += 1;
                trace!(?outcome, "Processing outcome");
                self.process_outcome(outcome)
            }
        };

        for effect in effects {
            self.executor.execute(effect);
        }
        for event in events {
            self.post(event);
        }
    }

    fn process_command(&mut self, command: Command) -> Reaction {
        let state = &mut self.state;
        match command {
            Command::Track {
                trackable,
                completion,
            } => SessionHandlers::handle_track(state, trackable, completion),
            Command::Add {
                trackable,
                completion,
            } => SessionHandlers::handle_add(state, trackable, completion),
            Command::Remove {
                trackable,
                completion,
            } => SessionHandlers::handle_remove(state, trackable, completion),
            Command::ChangeRoutingProfile {
                profile,
                completion,
            } => SessionHandlers::handle_change_routing_profile(state, profile, completion),
            Command::Stop { completion } => SessionHandlers::handle_stop(state, completion),
            Command::GetActiveTrackable { completion } => {
                SessionHandlers::handle_get_active_trackable(state, completion)
            }
            Command::GetRoutingProfile { completion } => {
                SessionHandlers::handle_get_routing_profile(state, completion)
            }
            Command::RefreshResolutionPolicy => {
                SessionHandlers::handle_refresh_resolution_policy(state)
            }
            Command::SetProximityThreshold { threshold, handler } => {
                SessionHandlers::handle_set_proximity_threshold(state, threshold, handler)
            }
            Command::CancelProximityThreshold => {
                SessionHandlers::handle_cancel_proximity_threshold(state)
            }
        }
    }

    fn process_event(&mut self, event: Event) -> Reaction {
        let state = &mut self.state;
        match event {
            Event::ClientConnectionChanged { state: connection } => {
                SessionHandlers::handle_client_connection_changed(state, connection)
            }
            Event::ChannelConnectionChanged {
                trackable_id,
                state: connection,
            } => SessionHandlers::handle_channel_connection_changed(state, trackable_id, connection),
            Event::PresenceMessage {
                trackable_id,
                message,
            } => SessionHandlers::handle_presence_message(state, trackable_id, message),
            Event::EnhancedLocation { update } => {
                SessionHandlers::handle_enhanced_location(state, update)
            }
            Event::RawLocation { update } => SessionHandlers::handle_raw_location(state, update),
            Event::CollaboratorError { error } => {
                SessionHandlers::handle_collaborator_error(state, error)
            }
        }
    }

    fn process_outcome(&mut self, outcome: Outcome) -> Reaction {
        let state = &mut self.state;
        match outcome {
            Outcome::ConnectFinished { trackable, result } => {
                SessionHandlers::handle_connect_finished(state, trackable, result)
            }
            Outcome::PresenceJoined { trackable } => {
                SessionHandlers::handle_presence_joined(state, trackable)
            }
            Outcome::TrackableReadyToTrack {
                trackable,
                completion,
            } => SessionHandlers::handle_ready_to_track(state, trackable, completion),
            Outcome::DisconnectFinished {
                trackable,
                result,
                completion,
            } => SessionHandlers::handle_disconnect_finished(state, trackable, result, completion),
            Outcome::RouteFetched {
                trackable_id,
                profile,
                result,
                completion,
            } => SessionHandlers::handle_route_fetched(
                state,
                trackable_id,
                profile,
                result,
                completion,
            ),
            Outcome::CloseFinished { result } => {
                SessionHandlers::handle_close_finished(state, result)
            }
            Outcome::EnhancedSendFinished {
                trackable_id,
                generation,
                result,
            } => SessionHandlers::handle_enhanced_send_finished(
                state,
                trackable_id,
                generation,
                result,
            ),
            Outcome::RawSendFinished {
                trackable_id,
                generation,
                result,
            } => SessionHandlers::handle_raw_send_finished(state, trackable_id, generation, result),
        }
    }

    fn post(&self, event: DelegateEvent) {
        if self.foreground.send(ForegroundJob::Delegate(event)).is_err() {
            warn!("Foreground dispatcher closed, dropping delegate notification");
        }
    }
}
