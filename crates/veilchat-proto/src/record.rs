//! Message record type.
//!
//! A record is either a text message or a photo reference, never both.
//! The log schema predates this crate, so serialized field names follow
//! the deployed camel-case convention.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry in the shared message log.
///
/// Exactly one of `text` and `photo_url` should be present. Both fields
/// stay independently optional in the serialized form because deployed
/// writers were never prevented from emitting bad records; readers
/// validate with [`MessageRecord::payload`] instead of trusting the
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message body, absent for photo records.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,

    /// Display name of the sender.
    #[serde(rename = "name")]
    pub sender_name: String,

    /// Photo location, absent for text records.
    #[serde(rename = "photoUrl", skip_serializing_if = "Option::is_none", default)]
    pub photo_url: Option<String>,
}

/// The payload carried by a structurally valid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// A text message body.
    Text(&'a str),
    /// A photo location.
    Photo(&'a str),
}

/// Structural record violations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Both `text` and `photoUrl` were present.
    #[error("record carries both text and a photo URL")]
    ConflictingPayload,

    /// Neither `text` nor `photoUrl` was present.
    #[error("record carries neither text nor a photo URL")]
    EmptyPayload,
}

impl MessageRecord {
    /// Create a text record.
    pub fn text(text: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self { text: Some(text.into()), sender_name: sender_name.into(), photo_url: None }
    }

    /// Create a photo record.
    pub fn photo(photo_url: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self { text: None, sender_name: sender_name.into(), photo_url: Some(photo_url.into()) }
    }

    /// Classify the record's payload, rejecting malformed shapes.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ConflictingPayload`] if both payload
    /// fields are set, or [`RecordError::EmptyPayload`] if neither is.
    pub fn payload(&self) -> Result<Payload<'_>, RecordError> {
        match (self.text.as_deref(), self.photo_url.as_deref()) {
            (Some(_), Some(_)) => Err(RecordError::ConflictingPayload),
            (Some(text), None) => Ok(Payload::Text(text)),
            (None, Some(url)) => Ok(Payload::Photo(url)),
            (None, None) => Err(RecordError::EmptyPayload),
        }
    }
}
