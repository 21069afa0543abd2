//! Remote log abstraction.
//!
//! The message history lives in an append-ordered collection owned by a
//! backend service. This module defines the callback surface that
//! backend adapters must provide and an in-process implementation used
//! by tests and local tooling.
//!
//! ## Responsibilities
//!
//! - Append: Accept records from the send path
//! - Notify: Push every log mutation to registered listeners in order
//! - Replay: On registration, deliver the existing history before any
//!   live notification
//!
//! Listener callbacks are invoked synchronously by the log and must not
//! block or call back into the same log.

use std::sync::{Mutex, PoisonError};

use veilchat_proto::MessageRecord;

/// A change observed on the remote log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A record was appended.
    Added(MessageRecord),
    /// An existing record was modified in place.
    Changed(MessageRecord),
    /// A record was removed.
    Removed(MessageRecord),
    /// A record changed position in the collection.
    Moved(MessageRecord),
    /// The subscription was torn down by the backend.
    Cancelled {
        /// Backend-supplied failure description.
        reason: String,
    },
}

/// Callback invoked for every log change.
pub type LogListener = Box<dyn Fn(LogEvent) + Send + Sync>;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Errors surfaced by the remote log.
#[derive(Debug, thiserror::Error)]
#[error("remote log error: {reason}")]
pub struct LogError {
    /// Backend-supplied failure description.
    pub reason: String,
}

/// An append-ordered record collection with change notification.
///
/// Implementations must deliver events for a given listener in append
/// order, and `register` must replay the full existing history to the
/// new listener before it observes any live event. Nothing here
/// deduplicates: a backend that redelivers a record will produce a
/// duplicate event.
pub trait RemoteLog: Send + Sync {
    /// Append a record to the log.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the backend rejects the append.
    fn append(&self, record: MessageRecord) -> Result<(), LogError>;

    /// Register a change listener, replaying existing history first.
    fn register(&self, listener: LogListener) -> ListenerId;

    /// Remove a previously registered listener.
    ///
    /// Unknown IDs are ignored so teardown paths can be unconditional.
    fn unregister(&self, id: ListenerId);
}

/// In-process [`RemoteLog`] backed by a `Vec`.
///
/// Replay and live notification run under one lock, so a registering
/// listener can never miss a record or see one twice. The [`cancel`]
/// method simulates a backend tearing the subscription down, which real
/// adapters surface through [`LogEvent::Cancelled`].
///
/// [`cancel`]: MemoryLog::cancel
#[derive(Default)]
pub struct MemoryLog {
    inner: Mutex<MemoryLogInner>,
}

#[derive(Default)]
struct MemoryLogInner {
    records: Vec<MessageRecord>,
    listeners: Vec<(ListenerId, LogListener)>,
    next_listener: u64,
}

impl MemoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records in append order.
    pub fn records(&self) -> Vec<MessageRecord> {
        self.lock().records.clone()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Replace a record in place, emitting [`LogEvent::Changed`].
    ///
    /// Out-of-range indices are ignored; the backend this mirrors drops
    /// mutations of vanished children instead of failing them.
    pub fn update(&self, index: usize, record: MessageRecord) {
        let mut inner = self.lock();
        if let Some(slot) = inner.records.get_mut(index) {
            *slot = record.clone();
            for (_, listener) in &inner.listeners {
                listener(LogEvent::Changed(record.clone()));
            }
        }
    }

    /// Remove a record, emitting [`LogEvent::Removed`].
    ///
    /// Out-of-range indices are ignored.
    pub fn remove(&self, index: usize) {
        let mut inner = self.lock();
        if index < inner.records.len() {
            let record = inner.records.remove(index);
            for (_, listener) in &inner.listeners {
                listener(LogEvent::Removed(record.clone()));
            }
        }
    }

    /// Simulate a backend-side subscription failure.
    ///
    /// Broadcasts [`LogEvent::Cancelled`] to every listener. Listeners
    /// stay registered; whether to detach is the consumer's decision.
    pub fn cancel(&self, reason: &str) {
        let inner = self.lock();
        for (_, listener) in &inner.listeners {
            listener(LogEvent::Cancelled { reason: reason.to_string() });
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryLogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteLog for MemoryLog {
    fn append(&self, record: MessageRecord) -> Result<(), LogError> {
        let mut inner = self.lock();
        inner.records.push(record.clone());
        for (_, listener) in &inner.listeners {
            listener(LogEvent::Added(record.clone()));
        }
        Ok(())
    }

    fn register(&self, listener: LogListener) -> ListenerId {
        let mut inner = self.lock();
        for record in &inner.records {
            listener(LogEvent::Added(record.clone()));
        }
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, listener));
        id
    }

    fn unregister(&self, id: ListenerId) {
        self.lock().listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

impl std::fmt::Debug for MemoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryLog")
            .field("record_count", &inner.records.len())
            .field("listener_count", &inner.listeners.len())
            .finish()
    }
}
