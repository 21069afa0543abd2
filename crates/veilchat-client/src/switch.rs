//! Encryption mode selection.
//!
//! The cipher can be toggled at runtime through a user-facing setting.
//! The send path re-reads the switch on every message instead of caching
//! it, so a flipped setting takes effect on the very next send with no
//! restart or re-subscription.

use std::{
    str::FromStr,
    sync::{Arc, PoisonError, RwLock},
};

use thiserror::Error;

/// How outgoing records are written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    /// Write plaintext records.
    #[default]
    None,
    /// Encrypt record fields with the shared-key codec.
    Aes,
}

impl EncryptionMode {
    /// Stable setting-string form of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aes => "aes",
        }
    }
}

impl std::fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a mode setting string.
#[derive(Debug, Error)]
#[error("unknown encryption mode: {value:?}")]
pub struct ParseModeError {
    /// The unrecognized setting string.
    pub value: String,
}

impl FromStr for EncryptionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "aes" => Ok(Self::Aes),
            other => Err(ParseModeError { value: other.to_string() }),
        }
    }
}

/// Source of the current encryption mode.
///
/// Implementations must answer with the latest stored value on every
/// call; the pipeline never caches the result.
pub trait ModeSwitch: Send + Sync {
    /// The mode to apply to the next outgoing record.
    fn mode(&self) -> EncryptionMode;
}

/// A fixed mode is itself a switch. Useful when the application does
/// not expose the toggle.
impl ModeSwitch for EncryptionMode {
    fn mode(&self) -> EncryptionMode {
        *self
    }
}

/// Shared mutable [`ModeSwitch`] mirroring a settings store entry.
///
/// Clones share the same cell, so a settings handler can flip the mode
/// while the pipeline keeps reading through its own handle.
#[derive(Debug, Clone, Default)]
pub struct PreferenceSwitch {
    cell: Arc<RwLock<EncryptionMode>>,
}

impl PreferenceSwitch {
    /// Create a switch starting in the given mode.
    pub fn new(mode: EncryptionMode) -> Self {
        Self { cell: Arc::new(RwLock::new(mode)) }
    }

    /// Store a new mode, visible to the next `mode` call.
    pub fn set(&self, mode: EncryptionMode) {
        *self.cell.write().unwrap_or_else(PoisonError::into_inner) = mode;
    }
}

impl ModeSwitch for PreferenceSwitch {
    fn mode(&self) -> EncryptionMode {
        *self.cell.read().unwrap_or_else(PoisonError::into_inner)
    }
}
