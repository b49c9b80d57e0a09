//! Public Publisher Handle
//!
//! Every call is turned into a `Command` and queued; nothing runs on the caller's
//! task. The async methods await the reply, the `*_with_callback` variants
//! deliver it on the foreground dispatcher instead.

use tokio::sync::oneshot;
use trackcast_core::channel::{ForegroundSender, MessageSender};
use trackcast_core::{
    Command, Completion, Message, PublisherError, PublisherResult, RoutingProfile, Trackable,
};

/// Handle to a running publisher session
///
/// Clones share the same session. The session task ends once every handle has
/// been dropped.
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: MessageSender,
    foreground: ForegroundSender,
}

impl Publisher {
    pub(crate) fn new(sender: MessageSender, foreground: ForegroundSender) -> Self {
        Self { sender, foreground }
    }

    // ---- Async API ----

    /// Add the trackable if needed and make it the active one
    pub async fn track(&self, trackable: Trackable) -> PublisherResult<()> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::Track {
            trackable,
            completion,
        });
        await_reply(reply).await
    }

    /// Start publishing for the trackable without making it active
    pub async fn add(&self, trackable: Trackable) -> PublisherResult<()> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::Add {
            trackable,
            completion,
        });
        await_reply(reply).await
    }

    /// Stop publishing for the trackable; returns whether it was present
    pub async fn remove(&self, trackable: Trackable) -> PublisherResult<bool> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::Remove {
            trackable,
            completion,
        });
        await_reply(reply).await
    }

    pub async fn change_routing_profile(&self, profile: RoutingProfile) -> PublisherResult<()> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::ChangeRoutingProfile {
            profile,
            completion,
        });
        await_reply(reply).await
    }

    /// Stop the session; later calls fail with `PublisherStopped`
    pub async fn stop(&self) -> PublisherResult<()> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::Stop { completion });
        await_reply(reply).await
    }

    pub async fn active_trackable(&self) -> PublisherResult<Option<Trackable>> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::GetActiveTrackable { completion });
        await_reply(reply).await
    }

    pub async fn routing_profile(&self) -> PublisherResult<RoutingProfile> {
        let (completion, reply) = Completion::channel();
        self.submit(Command::GetRoutingProfile { completion });
        await_reply(reply).await
    }

    // ---- Callback API ----

    pub fn track_with_callback<F>(&self, trackable: Trackable, callback: F)
    where
        F: FnOnce(PublisherResult<()>) + Send + 'static,
    {
        let completion = Completion::foreground(self.foreground.clone(), callback);
        self.submit(Command::Track {
            trackable,
            completion,
        });
    }

    pub fn add_with_callback<F>(&self, trackable: Trackable, callback: F)
    where
        F: FnOnce(PublisherResult<()>) + Send + 'static,
    {
        let completion = Completion::foreground(self.foreground.clone(), callback);
        self.submit(Command::Add {
            trackable,
            completion,
        });
    }

    pub fn remove_with_callback<F>(&self, trackable: Trackable, callback: F)
    where
        F: FnOnce(PublisherResult<bool>) + Send + 'static,
    {
        let completion = Completion::foreground(self.foreground.clone(), callback);
        self.submit(Command::Remove {
            trackable,
            completion,
        });
    }

    pub fn change_routing_profile_with_callback<F>(&self, profile: RoutingProfile, callback: F)
    where
        F: FnOnce(PublisherResult<()>) + Send + 'static,
    {
        let completion = Completion::foreground(self.foreground.clone(), callback);
        self.submit(Command::ChangeRoutingProfile {
            profile,
            completion,
        });
    }

    pub fn stop_with_callback<F>(&self, callback: F)
    where
        F: FnOnce(PublisherResult<()>) + Send + 'static,
    {
        let completion = Completion::foreground(self.foreground.clone(), callback);
        self.submit(Command::Stop { completion });
    }

    fn submit(&self, command: Command) {
        if let Err(error) = self.sender.send(Message::Command(command)) {
            if let Message::Command(command) = error.0 {
                command.reject(PublisherError::channel_error("publisher task is not running"));
            }
        }
    }
}

async fn await_reply<T>(reply: oneshot::Receiver<PublisherResult<T>>) -> PublisherResult<T> {
    reply
        .await
        .map_err(|_| PublisherError::channel_error("publisher dropped the reply"))?
}
