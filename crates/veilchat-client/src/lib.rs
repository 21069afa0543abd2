//! Veilchat message sync pipeline.
//!
//! This crate turns a backend-owned, append-ordered message log into an
//! ordered stream of decoded records, and composes the records written
//! back on send. Encryption sits inside the pipeline as a per-field
//! codec, toggled at runtime by a user setting.
//!
//! ## Architecture
//!
//! ```text
//! veilchat-client
//!   ├─ ChatClient      (lifecycle + send entry points)
//!   ├─ Outbox          (limit check + mode + encode per send)
//!   ├─ MessageFeed     (driver: listener registration + pump task)
//!   ├─ Subscription    (pure attach/detach/generation state machine)
//!   ├─ ModeSwitch      (runtime encryption toggle)
//!   └─ RemoteLog       (backend adapter trait + in-memory impl)
//! ```
//!
//! The feed follows the same shape as the rest of the pipeline: a pure
//! state machine (`Subscription`) decides which events are live, and a
//! driver (`MessageFeed`) owns the I/O around it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod feed;
mod log;
mod outbound;
mod subscription;
mod switch;

pub use client::{ANONYMOUS_SENDER, ChatClient, ClientConfig, DEFAULT_MESSAGE_LENGTH_LIMIT};
pub use error::ClientError;
pub use feed::{FeedEvent, MessageFeed};
pub use log::{ListenerId, LogError, LogEvent, LogListener, MemoryLog, RemoteLog};
pub use outbound::Outbox;
pub use subscription::{Generation, Subscription, SubscriptionState};
pub use switch::{EncryptionMode, ModeSwitch, ParseModeError, PreferenceSwitch};
