//! Chat client assembly.
//!
//! Wires the cipher, the outbox, and the message feed into one handle
//! that mirrors a chat screen's lifecycle: construct at startup, attach
//! on sign-in, detach on sign-out, send in between.

use std::sync::Arc;

use tokio::sync::mpsc;
use veilchat_crypto::CipherCodec;

use crate::{
    error::ClientError,
    feed::{FeedEvent, MessageFeed},
    log::RemoteLog,
    outbound::Outbox,
    switch::ModeSwitch,
};

/// Sender name stamped on records before sign-in.
pub const ANONYMOUS_SENDER: &str = "anonymous";

/// Default outgoing message length limit, in characters.
pub const DEFAULT_MESSAGE_LENGTH_LIMIT: usize = 1000;

/// Client construction parameters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Outgoing message length limit, in characters. May be replaced at
    /// runtime via [`ChatClient::set_message_length_limit`] when the
    /// deployment pushes a new value.
    pub message_length_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { message_length_limit: DEFAULT_MESSAGE_LENGTH_LIMIT }
    }
}

/// Handle over the whole message pipeline.
///
/// Reads arrive on the receiver returned by [`start`]; writes go
/// through [`send_text`] and [`send_photo`]. The client begins signed
/// out: detached from the feed and sending as [`ANONYMOUS_SENDER`].
///
/// [`start`]: ChatClient::start
/// [`send_text`]: ChatClient::send_text
/// [`send_photo`]: ChatClient::send_photo
pub struct ChatClient {
    feed: MessageFeed,
    outbox: Outbox,
    log: Arc<dyn RemoteLog>,
}

impl ChatClient {
    /// Start a client with encryption support.
    ///
    /// Must be called within a Tokio runtime; the feed's delivery pump
    /// is spawned onto it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cipher`] if `key` is not a valid cipher
    /// key. No client is constructed in that case: a failed cipher
    /// init never downgrades to writing plaintext.
    pub fn start(
        log: Arc<dyn RemoteLog>,
        switch: Arc<dyn ModeSwitch>,
        key: &[u8],
        config: ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FeedEvent>), ClientError> {
        let codec = CipherCodec::new(key)?;
        Ok(Self::assemble(log, switch, Some(codec), &config))
    }

    /// Start a client with no cipher at all.
    ///
    /// Sends in plaintext mode work normally; selecting encrypted mode
    /// makes sends fail with [`ClientError::EncryptionUnavailable`].
    /// Incoming encrypted records are delivered as stored.
    pub fn start_without_encryption(
        log: Arc<dyn RemoteLog>,
        switch: Arc<dyn ModeSwitch>,
        config: ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
        Self::assemble(log, switch, None, &config)
    }

    fn assemble(
        log: Arc<dyn RemoteLog>,
        switch: Arc<dyn ModeSwitch>,
        codec: Option<CipherCodec>,
        config: &ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
        let (feed, events) = MessageFeed::start(Arc::clone(&log), codec.clone());
        let outbox = Outbox::new(codec, switch, ANONYMOUS_SENDER, config.message_length_limit);
        (Self { feed, outbox, log }, events)
    }

    /// Sign in and start receiving messages.
    ///
    /// Subsequent sends carry `sender_name`. Attaching replays the
    /// existing history before live messages. Signing in while already
    /// signed in updates the name without re-subscribing.
    pub fn sign_in(&mut self, sender_name: impl Into<String>) {
        let sender_name = sender_name.into();
        tracing::info!("Signing in as {}", sender_name);
        self.outbox.set_sender_name(sender_name);
        self.feed.attach();
    }

    /// Sign out, stop receiving, and revert to the anonymous sender.
    pub fn sign_out(&mut self) {
        tracing::info!("Signing out");
        self.outbox.set_sender_name(ANONYMOUS_SENDER);
        self.feed.detach();
    }

    /// Attach the feed without changing the sender name.
    pub fn attach(&mut self) {
        self.feed.attach();
    }

    /// Detach the feed without changing the sender name.
    pub fn detach(&mut self) {
        self.feed.detach();
    }

    /// Whether the feed is currently attached.
    pub fn is_attached(&self) -> bool {
        self.feed.is_attached()
    }

    /// The sender name stamped on outgoing records.
    pub fn sender_name(&self) -> &str {
        self.outbox.sender_name()
    }

    /// Replace the message length limit, as pushed by deployment
    /// configuration.
    pub fn set_message_length_limit(&mut self, limit: usize) {
        tracing::debug!("Message length limit set to {}", limit);
        self.outbox.set_length_limit(limit);
    }

    /// Send a text message.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MessageTooLong`] if `text` exceeds the
    /// limit, [`ClientError::EncryptionUnavailable`] if encrypted mode
    /// is selected without a cipher, or [`ClientError::Log`] if the
    /// backend rejects the append.
    pub fn send_text(&self, text: &str) -> Result<(), ClientError> {
        let record = self.outbox.compose_text(text)?;
        self.log.append(record)?;
        tracing::debug!("Text record appended");
        Ok(())
    }

    /// Send a photo by its uploaded location.
    ///
    /// The caller uploads the photo through its storage collaborator
    /// first and passes the resulting URL here; only the URL ever
    /// reaches the log.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EncryptionUnavailable`] if encrypted mode
    /// is selected without a cipher, or [`ClientError::Log`] if the
    /// backend rejects the append.
    pub fn send_photo(&self, photo_url: &str) -> Result<(), ClientError> {
        let record = self.outbox.compose_photo(photo_url)?;
        self.log.append(record)?;
        tracing::debug!("Photo record appended");
        Ok(())
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("feed", &self.feed)
            .field("outbox", &self.outbox)
            .finish()
    }
}
