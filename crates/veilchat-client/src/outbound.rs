//! Outgoing record composition.
//!
//! Builds the record that actually lands in the log for each send,
//! applying the length limit and the encryption mode in effect at that
//! moment. The mode switch is consulted per call; flipping the setting
//! between two sends changes only the second record.

use std::sync::Arc;

use veilchat_crypto::CipherCodec;
use veilchat_proto::MessageRecord;

use crate::{
    error::ClientError,
    switch::{EncryptionMode, ModeSwitch},
};

/// Composer for outgoing records.
pub struct Outbox {
    codec: Option<CipherCodec>,
    switch: Arc<dyn ModeSwitch>,
    sender_name: String,
    length_limit: usize,
}

impl Outbox {
    /// Create an outbox writing on behalf of `sender_name`.
    pub fn new(
        codec: Option<CipherCodec>,
        switch: Arc<dyn ModeSwitch>,
        sender_name: impl Into<String>,
        length_limit: usize,
    ) -> Self {
        Self { codec, switch, sender_name: sender_name.into(), length_limit }
    }

    /// The sender name stamped on outgoing records.
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Change the sender name for subsequent records.
    pub fn set_sender_name(&mut self, sender_name: impl Into<String>) {
        self.sender_name = sender_name.into();
    }

    /// Change the message length limit for subsequent records.
    pub fn set_length_limit(&mut self, length_limit: usize) {
        self.length_limit = length_limit;
    }

    /// Compose a text record.
    ///
    /// The limit applies to the plaintext character count, before any
    /// encryption expands it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MessageTooLong`] if `text` exceeds the
    /// limit, or [`ClientError::EncryptionUnavailable`] if encrypted
    /// mode is selected without a cipher.
    pub fn compose_text(&self, text: &str) -> Result<MessageRecord, ClientError> {
        let len = text.chars().count();
        if len > self.length_limit {
            return Err(ClientError::MessageTooLong { len, limit: self.length_limit });
        }
        let (text, sender_name) = self.seal(text)?;
        Ok(MessageRecord::text(text, sender_name))
    }

    /// Compose a photo record. Photo locations are not length limited.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EncryptionUnavailable`] if encrypted mode
    /// is selected without a cipher.
    pub fn compose_photo(&self, photo_url: &str) -> Result<MessageRecord, ClientError> {
        let (photo_url, sender_name) = self.seal(photo_url)?;
        Ok(MessageRecord::photo(photo_url, sender_name))
    }

    /// Apply the current encryption mode to a payload and the sender
    /// name.
    fn seal(&self, payload: &str) -> Result<(String, String), ClientError> {
        match self.switch.mode() {
            EncryptionMode::None => Ok((payload.to_owned(), self.sender_name.clone())),
            EncryptionMode::Aes => {
                let codec = self.codec.as_ref().ok_or(ClientError::EncryptionUnavailable)?;
                Ok((codec.encode(payload), codec.encode(&self.sender_name)))
            },
        }
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("sender_name", &self.sender_name)
            .field("length_limit", &self.length_limit)
            .field("has_codec", &self.codec.is_some())
            .finish()
    }
}
