//! Veilchat Record Cipher
//!
//! This crate implements the symmetric cipher used to scramble message
//! records before they reach the shared log. It exists for wire
//! compatibility with the deployed record format, which predates any
//! modern envelope design.
//!
//! # Design
//!
//! All operations in this crate are pure - the same key and input always
//! produce the same output. There is no IV, no nonce, and no randomness,
//! enabling:
//!
//! - Deterministic testing without seeded RNG plumbing
//! - Stateless encode/decode from any number of call sites
//! - Ciphertext that survives storage in string-typed log fields
//!
//! # Security Properties
//!
//! This cipher is an obfuscation layer, not a modern AEAD. Callers must
//! understand what it does NOT provide:
//!
//! - No Semantic Security: Equal plaintexts under the same key produce
//!   equal ciphertexts, so repeated messages are linkable
//! - No Integrity: Ciphertext is unauthenticated and silently malleable
//! - No Forward Secrecy: A single static key protects the whole log
//!
//! Decoding is fail-open: input that cannot be decrypted is returned
//! unchanged so that mixed plaintext/ciphertext logs stay readable.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;

pub use codec::{CipherCodec, CipherError, KEY_SIZE};
