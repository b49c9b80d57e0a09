//! Error types for the trackcast publisher
//!
//! Every failure surfaced by the publisher is one of the kinds below. Errors are
//! delivered either through the completion of the originating call or, when no
//! single caller owns them, through the delegate's error notification.

// ----------------------------------------------------------------------------
// Publisher Error
// ----------------------------------------------------------------------------

/// Core error type for the publisher session
///
/// Errors are `Clone` so a single connect result can be handed to every caller
/// waiting on the same trackable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum PublisherError {
    /// A required collaborator was not supplied when building the publisher
    #[error("Incomplete configuration: missing {missing}")]
    IncompleteConfiguration { missing: String },

    /// The operation was attempted after `stop` was requested
    #[error("Publisher is stopped")]
    PublisherStopped,

    /// A trackable with the same id is already tracked
    #[error("Trackable already exists: {trackable_id}")]
    TrackableAlreadyExists { trackable_id: String },

    /// Failure reported by the pub/sub transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failure reported by the location sensing engine
    #[error("Sensing error: {0}")]
    Sensing(String),

    /// The destination could not be routed to
    #[error("Invalid destination: {reason}")]
    InvalidDestination { reason: String },

    /// The publisher task is gone and its queue is closed
    #[error("Channel error: {message}")]
    Channel { message: String },

    /// Configuration failed validation
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl PublisherError {
    /// Create an incomplete configuration error naming the missing part
    pub fn incomplete<T: Into<String>>(missing: T) -> Self {
        PublisherError::IncompleteConfiguration {
            missing: missing.into(),
        }
    }

    /// Create a transport error with a message
    pub fn transport<T: Into<String>>(message: T) -> Self {
        PublisherError::Transport(message.into())
    }

    /// Create a sensing error with a message
    pub fn sensing<T: Into<String>>(message: T) -> Self {
        PublisherError::Sensing(message.into())
    }

    /// Create an invalid destination error with a reason
    pub fn invalid_destination<T: Into<String>>(reason: T) -> Self {
        PublisherError::InvalidDestination {
            reason: reason.into(),
        }
    }

    /// Create a channel error with a message
    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        PublisherError::Channel {
            message: message.into(),
        }
    }

    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        PublisherError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error means the session no longer accepts work
    pub fn is_stopped(&self) -> bool {
        matches!(self, PublisherError::PublisherStopped)
    }
}

/// Result type for publisher operations
pub type PublisherResult<T> = Result<T, PublisherError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
