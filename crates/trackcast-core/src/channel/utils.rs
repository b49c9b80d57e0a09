//! Channel type aliases and queue handles
//!
//! The session queue is unbounded so `enqueue` never blocks the caller. Only the
//! public `Publisher` handle holds a strong sender; everything else enqueues
//! through a weak `SessionQueue`, so the task ends once the last handle is gone.

use super::communication::{DelegateEvent, Event, Message};
use crate::errors::{PublisherError, PublisherResult};
use crate::location::{EnhancedLocationUpdate, RawLocationUpdate};
use crate::types::{ConnectionState, PresenceMessage};
use core::fmt;
use tokio::sync::mpsc;

// ----------------------------------------------------------------------------
// Channel Types
// ----------------------------------------------------------------------------

pub type MessageSender = mpsc::UnboundedSender<Message>;
pub type MessageReceiver = mpsc::UnboundedReceiver<Message>;

pub type ForegroundSender = mpsc::UnboundedSender<ForegroundJob>;
pub type ForegroundReceiver = mpsc::UnboundedReceiver<ForegroundJob>;

/// Work executed on the foreground dispatcher
pub enum ForegroundJob {
    Callback(Box<dyn FnOnce() + Send>),
    Delegate(DelegateEvent),
}

impl fmt::Debug for ForegroundJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForegroundJob::Callback(_) => f.write_str("ForegroundJob::Callback"),
            ForegroundJob::Delegate(event) => write!(f, "ForegroundJob::Delegate({event:?})"),
        }
    }
}

pub fn create_message_channel() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}

pub fn create_foreground_channel() -> (ForegroundSender, ForegroundReceiver) {
    mpsc::unbounded_channel()
}

// ----------------------------------------------------------------------------
// Session Queue
// ----------------------------------------------------------------------------

/// Non-owning handle for enqueuing onto the publisher task
#[derive(Clone)]
pub struct SessionQueue {
    sender: mpsc::WeakUnboundedSender<Message>,
}

impl SessionQueue {
    pub fn new(sender: &MessageSender) -> Self {
        Self {
            sender: sender.downgrade(),
        }
    }

    /// Append a message to the queue without waiting for it to run
    pub fn enqueue<M: Into<Message>>(&self, message: M) -> PublisherResult<()> {
        let sender = self
            .sender
            .upgrade()
            .ok_or_else(|| PublisherError::channel_error("publisher queue closed"))?;
        sender
            .send(message.into())
            .map_err(|_| PublisherError::channel_error("publisher task stopped receiving"))
    }
}

impl fmt::Debug for SessionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionQueue").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Event Sender
// ----------------------------------------------------------------------------

/// Handle given to collaborators for reporting events to the publisher
#[derive(Debug, Clone)]
pub struct EventSender {
    queue: SessionQueue,
}

impl EventSender {
    pub fn new(queue: SessionQueue) -> Self {
        Self { queue }
    }

    pub fn send(&self, event: Event) -> PublisherResult<()> {
        self.queue.enqueue(event)
    }

    pub fn client_connection_changed(&self, state: ConnectionState) -> PublisherResult<()> {
        self.send(Event::ClientConnectionChanged { state })
    }

    pub fn channel_connection_changed<T: Into<String>>(
        &self,
        trackable_id: T,
        state: ConnectionState,
    ) -> PublisherResult<()> {
        self.send(Event::ChannelConnectionChanged {
            trackable_id: trackable_id.into(),
            state,
        })
    }

    pub fn presence_message<T: Into<String>>(
        &self,
        trackable_id: T,
        message: PresenceMessage,
    ) -> PublisherResult<()> {
        self.send(Event::PresenceMessage {
            trackable_id: trackable_id.into(),
            message,
        })
    }

    pub fn enhanced_location(&self, update: EnhancedLocationUpdate) -> PublisherResult<()> {
        self.send(Event::EnhancedLocation { update })
    }

    pub fn raw_location(&self, update: RawLocationUpdate) -> PublisherResult<()> {
        self.send(Event::RawLocation { update })
    }

    /// Report a failure no publisher call is waiting on
    pub fn error(&self, error: PublisherError) -> PublisherResult<()> {
        self.send(Event::CollaboratorError { error })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_delivers_in_order() {
        let (sender, mut receiver) = create_message_channel();
        let events = EventSender::new(SessionQueue::new(&sender));

        events.client_connection_changed(ConnectionState::Online).unwrap();
        events
            .channel_connection_changed("t1", ConnectionState::Failed)
            .unwrap();
        events.error(PublisherError::sensing("gps lost")).unwrap();

        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Event(Event::ClientConnectionChanged { .. }))
        ));
        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Event(Event::ChannelConnectionChanged { .. }))
        ));
        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Event(Event::CollaboratorError {
                error: PublisherError::Sensing(_)
            }))
        ));
    }

    #[test]
    fn test_queue_closes_with_last_strong_sender() {
        let (sender, _receiver) = create_message_channel();
        let queue = SessionQueue::new(&sender);
        drop(sender);

        let result = EventSender::new(queue).client_connection_changed(ConnectionState::Offline);
        assert!(matches!(result, Err(PublisherError::Channel { .. })));
    }
}
