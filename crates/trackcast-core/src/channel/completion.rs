//! Completion handles for public operations
//!
//! How a result is delivered is decided once, when the completion is created:
//! straight back to an awaiting caller, inline on the publisher task, or on the
//! foreground dispatcher.

use super::utils::{ForegroundJob, ForegroundSender};
use crate::errors::{PublisherError, PublisherResult};
use core::fmt;
use tokio::sync::oneshot;
use tracing::warn;

/// Callback invoked with the result of an operation
pub type ResultCallback<T> = Box<dyn FnOnce(PublisherResult<T>) + Send>;

/// A one-shot handle that receives the result of an operation
pub enum Completion<T> {
    /// Reply to an awaiting future; the caller's own context receives it
    Reply(oneshot::Sender<PublisherResult<T>>),
    /// Run the callback inline on the publisher task (internal use)
    Inline(ResultCallback<T>),
    /// Run the callback on the foreground dispatcher
    Foreground {
        callback: ResultCallback<T>,
        queue: ForegroundSender,
    },
}

impl<T: Send + 'static> Completion<T> {
    /// Create a reply completion and the receiver to await it on
    pub fn channel() -> (Self, oneshot::Receiver<PublisherResult<T>>) {
        let (sender, receiver) = oneshot::channel();
        (Completion::Reply(sender), receiver)
    }

    pub fn inline<F>(callback: F) -> Self
    where
        F: FnOnce(PublisherResult<T>) + Send + 'static,
    {
        Completion::Inline(Box::new(callback))
    }

    pub fn foreground<F>(queue: ForegroundSender, callback: F) -> Self
    where
        F: FnOnce(PublisherResult<T>) + Send + 'static,
    {
        Completion::Foreground {
            callback: Box::new(callback),
            queue,
        }
    }

    /// Deliver the result, consuming the completion
    pub fn complete(self, result: PublisherResult<T>) {
        match self {
            Completion::Reply(sender) => {
                // The caller may have stopped waiting
                let _ = sender.send(result);
            }
            Completion::Inline(callback) => callback(result),
            Completion::Foreground { callback, queue } => {
                let job = ForegroundJob::Callback(Box::new(move || callback(result)));
                if queue.send(job).is_err() {
                    warn!("Foreground dispatcher closed, dropping completion");
                }
            }
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: PublisherError) {
        self.complete(Err(error));
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Reply(_) => f.write_str("Completion::Reply"),
            Completion::Inline(_) => f.write_str("Completion::Inline"),
            Completion::Foreground { .. } => f.write_str("Completion::Foreground"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
