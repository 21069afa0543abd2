//! Client error types.

use thiserror::Error;
use veilchat_crypto::CipherError;

use crate::log::LogError;

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Encrypted mode is selected but no cipher was initialized.
    #[error("encrypted mode selected but no cipher is available")]
    EncryptionUnavailable,

    /// Outgoing message body exceeds the configured limit.
    #[error("message length {len} exceeds the {limit} character limit")]
    MessageTooLong {
        /// Character count of the rejected message.
        len: usize,
        /// Limit in effect at send time.
        limit: usize,
    },

    /// Cipher construction failed.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// The remote log rejected an operation.
    #[error(transparent)]
    Log(#[from] LogError),
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate a broken deployment: a bad key or cipher
    /// misconfiguration that no retry will fix. Transient errors can be
    /// recovered by the user or by retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Cipher(_) | Self::EncryptionUnavailable => true,
            Self::MessageTooLong { .. } | Self::Log(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_key_is_fatal() {
        let err = ClientError::Cipher(CipherError::InvalidKeyLength { len: 3 });
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_cipher_is_fatal() {
        assert!(ClientError::EncryptionUnavailable.is_fatal());
    }

    #[test]
    fn oversized_message_is_transient() {
        let err = ClientError::MessageTooLong { len: 1200, limit: 1000 };
        assert!(!err.is_fatal());
    }

    #[test]
    fn log_rejection_is_transient() {
        let err = ClientError::Log(LogError { reason: "quota exceeded".to_string() });
        assert!(!err.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = ClientError::MessageTooLong { len: 1200, limit: 1000 };
        assert_eq!(err.to_string(), "message length 1200 exceeds the 1000 character limit");
    }
}
