//! Publisher Session Protocol Types
//!
//! Everything that reaches the publisher task travels as a `Message` on a single
//! ordered queue:
//! - `Command`: public API calls and resolution policy requests
//! - `Event`: unsolicited notifications from the transport and location engine
//! - `Outcome`: results of asynchronous collaborator calls issued by the task
//!
//! The task answers with `Effect`s (collaborator calls) and `DelegateEvent`s
//! (notifications for the foreground delegate).

use super::completion::Completion;
use crate::errors::{PublisherError, PublisherResult};
use crate::location::{EnhancedLocationUpdate, RawLocationUpdate};
use crate::proximity::{Proximity, ProximityHandler};
use crate::types::{
    ConnectionState, LocationCoordinate, PresenceData, PresenceMessage, Resolution, Route,
    RoutingProfile, Trackable,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ----------------------------------------------------------------------------
// Command: Public API / Policy → Publisher Task
// ----------------------------------------------------------------------------

/// Commands submitted by the public handle and the resolution policy
#[derive(Debug)]
pub enum Command {
    /// Add the trackable if needed and make it the active one
    Track {
        trackable: Trackable,
        completion: Completion<()>,
    },
    /// Connect the trackable and start publishing for it
    Add {
        trackable: Trackable,
        completion: Completion<()>,
    },
    /// Disconnect the trackable; the reply says whether it was present
    Remove {
        trackable: Trackable,
        completion: Completion<bool>,
    },
    ChangeRoutingProfile {
        profile: RoutingProfile,
        completion: Completion<()>,
    },
    /// Stop the session; idempotent
    Stop { completion: Completion<()> },
    GetActiveTrackable {
        completion: Completion<Option<Trackable>>,
    },
    GetRoutingProfile {
        completion: Completion<RoutingProfile>,
    },
    /// Re-resolve every tracked trackable
    RefreshResolutionPolicy,
    SetProximityThreshold {
        threshold: Proximity,
        handler: Box<dyn ProximityHandler>,
    },
    CancelProximityThreshold,
}

impl Command {
    /// Fail the command's completion, if it carries one
    pub fn reject(self, error: PublisherError) {
        match self {
            Command::Track { completion, .. } | Command::Add { completion, .. } => {
                completion.fail(error)
            }
            Command::Remove { completion, .. } => completion.fail(error),
            Command::ChangeRoutingProfile { completion, .. } => completion.fail(error),
            Command::Stop { completion } => completion.fail(error),
            Command::GetActiveTrackable { completion } => completion.fail(error),
            Command::GetRoutingProfile { completion } => completion.fail(error),
            Command::RefreshResolutionPolicy
            | Command::SetProximityThreshold { .. }
            | Command::CancelProximityThreshold => {}
        }
    }

    /// Short name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            Command::Track { .. } => "track",
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::ChangeRoutingProfile { .. } => "change_routing_profile",
            Command::Stop { .. } => "stop",
            Command::GetActiveTrackable { .. } => "get_active_trackable",
            Command::GetRoutingProfile { .. } => "get_routing_profile",
            Command::RefreshResolutionPolicy => "refresh_resolution_policy",
            Command::SetProximityThreshold { .. } => "set_proximity_threshold",
            Command::CancelProximityThreshold => "cancel_proximity_threshold",
        }
    }
}

// ----------------------------------------------------------------------------
// Event: Collaborators → Publisher Task
// ----------------------------------------------------------------------------

/// Notifications pushed by the transport and the location engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Client-level transport connection changed
    ClientConnectionChanged { state: ConnectionState },
    /// A trackable's channel connection changed
    ChannelConnectionChanged {
        trackable_id: String,
        state: ConnectionState,
    },
    /// Presence changed on a trackable's channel
    PresenceMessage {
        trackable_id: String,
        message: PresenceMessage,
    },
    EnhancedLocation { update: EnhancedLocationUpdate },
    RawLocation { update: RawLocationUpdate },
    /// Unsolicited failure inside a collaborator, forwarded to the delegate
    CollaboratorError { error: PublisherError },
}

// ----------------------------------------------------------------------------
// Outcome: Collaborator Results → Publisher Task
// ----------------------------------------------------------------------------

/// Results of asynchronous work started by the publisher task
#[derive(Debug)]
pub enum Outcome {
    ConnectFinished {
        trackable: Trackable,
        result: PublisherResult<()>,
    },
    /// Presence and channel listeners are registered for the trackable
    PresenceJoined { trackable: Trackable },
    TrackableReadyToTrack {
        trackable: Trackable,
        completion: Completion<()>,
    },
    DisconnectFinished {
        trackable: Trackable,
        result: PublisherResult<bool>,
        completion: Completion<bool>,
    },
    RouteFetched {
        trackable_id: String,
        profile: RoutingProfile,
        result: PublisherResult<Route>,
        completion: Completion<()>,
    },
    CloseFinished { result: PublisherResult<()> },
    EnhancedSendFinished {
        trackable_id: String,
        generation: u64,
        result: PublisherResult<()>,
    },
    RawSendFinished {
        trackable_id: String,
        generation: u64,
        result: PublisherResult<()>,
    },
}

// ----------------------------------------------------------------------------
// Message: the single queue payload
// ----------------------------------------------------------------------------

/// Anything the publisher task can dequeue
#[derive(Debug)]
pub enum Message {
    Command(Command),
    Event(Event),
    Outcome(Outcome),
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::Command(command)
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Message::Event(event)
    }
}

impl From<Outcome> for Message {
    fn from(outcome: Outcome) -> Self {
        Message::Outcome(outcome)
    }
}

// ----------------------------------------------------------------------------
// Effect: Publisher Task → Collaborators
// ----------------------------------------------------------------------------

/// Collaborator calls requested by the publisher task
///
/// Effects run in the order a handler returns them. Synchronous effects complete
/// before the next one starts; asynchronous ones report back as `Outcome`s.
#[derive(Debug)]
pub enum Effect {
    Connect {
        trackable: Trackable,
        presence_data: PresenceData,
    },
    SubscribeForPresenceMessages { trackable_id: String },
    SubscribeForChannelState { trackable_id: String },
    Disconnect {
        trackable: Trackable,
        presence_data: PresenceData,
        completion: Completion<bool>,
    },
    /// `generation` identifies the delivery state that issued the send
    SendEnhancedLocation {
        trackable_id: String,
        generation: u64,
        update: EnhancedLocationUpdate,
    },
    SendRawLocation {
        trackable_id: String,
        generation: u64,
        update: RawLocationUpdate,
    },
    UpdatePresenceData {
        trackable_id: String,
        presence_data: PresenceData,
    },
    Close { presence_data: PresenceData },
    StartUpdatingLocation,
    StopUpdatingLocation,
    StartRecordingLocation,
    StopRecordingLocation,
    ChangeEngineResolution { resolution: Resolution },
    FetchRoute {
        trackable_id: String,
        destination: LocationCoordinate,
        profile: RoutingProfile,
        completion: Completion<()>,
    },
    /// Re-enter the queue once every preceding effect has been issued
    Followup(Outcome),
}

// ----------------------------------------------------------------------------
// DelegateEvent: Publisher Task → Foreground Delegate
// ----------------------------------------------------------------------------

/// Notifications for the publisher delegate
#[derive(Debug, Clone)]
pub enum DelegateEvent {
    /// An error with no single originating caller
    Error { error: PublisherError },
    ConnectionStateChanged {
        trackable: Trackable,
        state: ConnectionState,
    },
    EnhancedLocationChanged { update: EnhancedLocationUpdate },
    ResolutionChanged { resolution: Resolution },
    TrackablesChanged { trackables: Vec<Trackable> },
    ProximityReached { threshold: Proximity },
    ProximityCancelled,
}

impl fmt::Display for DelegateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateEvent::Error { error } => write!(f, "error: {error}"),
            DelegateEvent::ConnectionStateChanged { trackable, state } => {
                write!(f, "connection state of {} is {:?}", trackable.id, state)
            }
            DelegateEvent::EnhancedLocationChanged { .. } => f.write_str("enhanced location changed"),
            DelegateEvent::ResolutionChanged { resolution } => {
                write!(f, "resolution changed to {resolution:?}")
            }
            DelegateEvent::TrackablesChanged { trackables } => {
                write!(f, "{} trackables", trackables.len())
            }
            DelegateEvent::ProximityReached { .. } => f.write_str("proximity reached"),
            DelegateEvent::ProximityCancelled => f.write_str("proximity cancelled"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
