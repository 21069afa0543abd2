//! Message feed driver.
//!
//! Bridges the remote log's synchronous callbacks into an ordered,
//! decoded stream of feed events for the application.
//!
//! # Design
//!
//! Log callbacks do no work themselves: each one stamps the event with
//! the generation that registered it and forwards it over an unbounded
//! channel. A single pump task drains that channel, so records are
//! decoded and delivered strictly one at a time in append order, no
//! matter how many callback threads the backend uses.
//!
//! Stale events are dropped by generation check rather than by racing
//! listener removal. Delivery and `detach` serialize on the
//! subscription lock, which is what makes detach a hard cutoff: once it
//! returns, the consumer sees nothing more from the old generation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use veilchat_crypto::CipherCodec;
use veilchat_proto::{MessageRecord, Payload, RecordError};

use crate::{
    log::{ListenerId, LogEvent, LogListener, RemoteLog},
    subscription::{Generation, Subscription},
};

/// An event delivered to the feed consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A decoded message record, in append order.
    Message(MessageRecord),
    /// The backend tore the subscription down.
    StreamError {
        /// Backend-supplied failure description.
        reason: String,
    },
}

/// Live view over a [`RemoteLog`].
///
/// Starting a feed spawns its delivery pump onto the current Tokio
/// runtime; events arrive on the receiver returned by [`start`]. The
/// feed begins detached and delivers nothing until [`attach`] is
/// called.
///
/// [`start`]: MessageFeed::start
/// [`attach`]: MessageFeed::attach
pub struct MessageFeed {
    log: Arc<dyn RemoteLog>,
    subscription: Arc<Mutex<Subscription>>,
    listener: Option<ListenerId>,
    events_tx: mpsc::UnboundedSender<(Generation, LogEvent)>,
}

impl MessageFeed {
    /// Start a feed over `log`, decoding records with `codec`.
    ///
    /// With no codec, records are delivered as stored; encrypted fields
    /// stay scrambled. Must be called within a Tokio runtime.
    pub fn start(
        log: Arc<dyn RemoteLog>,
        codec: Option<CipherCodec>,
    ) -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (consumer_tx, consumer_rx) = mpsc::unbounded_channel();
        let subscription = Arc::new(Mutex::new(Subscription::new()));

        tokio::spawn(run_pump(events_rx, Arc::clone(&subscription), codec, consumer_tx));

        (Self { log, subscription, listener: None, events_tx }, consumer_rx)
    }

    /// Begin observing the log.
    ///
    /// Registers a listener under a fresh generation; the backend
    /// replays existing history to it before live events. Calling
    /// attach while already attached is a no-op, so repeated sign-in
    /// style triggers never double-register.
    pub fn attach(&mut self) {
        let Some(generation) = lock(&self.subscription).attach() else {
            return;
        };

        let events_tx = self.events_tx.clone();
        let listener: LogListener = Box::new(move |event| {
            // Pump may already be gone during teardown.
            let _ = events_tx.send((generation, event));
        });
        self.listener = Some(self.log.register(listener));
        tracing::debug!("Attached to remote log at generation {}", generation);
    }

    /// Stop observing the log.
    ///
    /// The current generation goes stale before the listener is
    /// removed, so callbacks already in flight are dropped at delivery
    /// time. After this returns the consumer receives no further events
    /// until the next attach. Calling detach while detached is a no-op.
    pub fn detach(&mut self) {
        let Some(generation) = lock(&self.subscription).detach() else {
            return;
        };

        if let Some(id) = self.listener.take() {
            self.log.unregister(id);
        }
        tracing::debug!("Detached from remote log at generation {}", generation);
    }

    /// Whether the feed is currently observing the log.
    pub fn is_attached(&self) -> bool {
        lock(&self.subscription).is_attached()
    }
}

impl Drop for MessageFeed {
    fn drop(&mut self) {
        if let Some(id) = self.listener.take() {
            self.log.unregister(id);
        }
    }
}

impl std::fmt::Debug for MessageFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageFeed")
            .field("subscription", &*lock(&self.subscription))
            .field("listener", &self.listener)
            .finish()
    }
}

/// Drain stamped log events, decode them, and deliver to the consumer.
async fn run_pump(
    mut events: mpsc::UnboundedReceiver<(Generation, LogEvent)>,
    subscription: Arc<Mutex<Subscription>>,
    codec: Option<CipherCodec>,
    consumer: mpsc::UnboundedSender<FeedEvent>,
) {
    while let Some((generation, event)) = events.recv().await {
        // Cheap staleness check before decoding.
        if !lock(&subscription).accepts(generation) {
            continue;
        }

        let feed_event = match event {
            LogEvent::Added(record) => match decode_record(codec.as_ref(), &record) {
                Ok(decoded) => FeedEvent::Message(decoded),
                Err(err) => {
                    tracing::warn!("Skipping malformed record: {}", err);
                    continue;
                },
            },
            LogEvent::Cancelled { reason } => {
                tracing::warn!("Remote log cancelled subscription: {}", reason);
                FeedEvent::StreamError { reason }
            },
            // Mutation and position notices don't change the message stream.
            LogEvent::Changed(_) | LogEvent::Removed(_) | LogEvent::Moved(_) => continue,
        };

        // Delivery and detach serialize on this lock: after detach()
        // returns, this branch can no longer be taken for its
        // generation.
        let guard = lock(&subscription);
        if guard.accepts(generation) && consumer.send(feed_event).is_err() {
            tracing::debug!("Consumer gone, stopping delivery pump");
            return;
        }
    }
}

/// Decode one stored record into its application form.
///
/// The sender name and whichever payload field is present are decoded
/// independently; fail-open decoding means plaintext fields survive
/// unchanged.
fn decode_record(
    codec: Option<&CipherCodec>,
    record: &MessageRecord,
) -> Result<MessageRecord, RecordError> {
    let payload = record.payload()?;
    let sender_name = decode_field(codec, &record.sender_name);
    Ok(match payload {
        Payload::Text(text) => MessageRecord::text(decode_field(codec, text), sender_name),
        Payload::Photo(url) => MessageRecord::photo(decode_field(codec, url), sender_name),
    })
}

fn decode_field(codec: Option<&CipherCodec>, value: &str) -> String {
    codec.map_or_else(|| value.to_owned(), |codec| codec.decode(value))
}

fn lock(subscription: &Mutex<Subscription>) -> MutexGuard<'_, Subscription> {
    subscription.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use veilchat_crypto::KEY_SIZE;

    use super::*;

    const TEST_KEY: [u8; KEY_SIZE] = [7u8; KEY_SIZE];

    fn codec() -> CipherCodec {
        CipherCodec::new(&TEST_KEY).unwrap()
    }

    #[test]
    fn decode_record_recovers_encrypted_text() {
        let codec = codec();
        let stored = MessageRecord::text(codec.encode("hi there"), codec.encode("alice"));

        let decoded = decode_record(Some(&codec), &stored).unwrap();
        assert_eq!(decoded, MessageRecord::text("hi there", "alice"));
    }

    #[test]
    fn decode_record_recovers_encrypted_photo() {
        let codec = codec();
        let url = "https://example.com/p.jpg";
        let stored = MessageRecord::photo(codec.encode(url), codec.encode("bob"));

        let decoded = decode_record(Some(&codec), &stored).unwrap();
        assert_eq!(decoded, MessageRecord::photo(url, "bob"));
    }

    #[test]
    fn decode_record_passes_plaintext_through() {
        let stored = MessageRecord::text("plain", "carol");
        let decoded = decode_record(Some(&codec()), &stored).unwrap();
        assert_eq!(decoded, stored);
    }

    #[test]
    fn decode_record_without_codec_is_identity() {
        let codec = codec();
        let stored = MessageRecord::text(codec.encode("sealed"), codec.encode("alice"));

        let decoded = decode_record(None, &stored).unwrap();
        assert_eq!(decoded, stored);
    }

    #[test]
    fn decode_record_rejects_malformed_shapes() {
        let conflicting = MessageRecord {
            text: Some("hi".to_string()),
            sender_name: "alice".to_string(),
            photo_url: Some("https://example.com/p.jpg".to_string()),
        };
        assert!(matches!(
            decode_record(None, &conflicting),
            Err(RecordError::ConflictingPayload)
        ));

        let empty = MessageRecord { text: None, sender_name: "alice".to_string(), photo_url: None };
        assert!(matches!(decode_record(None, &empty), Err(RecordError::EmptyPayload)));
    }
}
