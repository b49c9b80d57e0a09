//! Session channel protocol
//!
//! Typed messages, effects and completions exchanged between the public handle,
//! the publisher task, collaborators and the foreground dispatcher.

pub mod communication;
pub mod completion;
pub mod utils;

pub use communication::{Command, DelegateEvent, Effect, Event, Message, Outcome};
pub use completion::{Completion, ResultCallback};
pub use utils::{
    create_foreground_channel, create_message_channel, EventSender, ForegroundJob,
    ForegroundReceiver, ForegroundSender, MessageReceiver, MessageSender, SessionQueue,
};
