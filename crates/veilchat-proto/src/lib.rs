//! Veilchat Wire Records
//!
//! This crate defines the record shape shared by every reader and writer
//! of the message log. The shape is fixed by already-deployed data, so
//! field names and optionality here are wire compatible, not negotiable.
//!
//! # Design
//!
//! Records are plain data with no cipher awareness. Whether a field
//! holds plaintext or ciphertext is decided by the pipeline around it;
//! the record itself only enforces structure (exactly one payload kind
//! per record).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod record;

pub use record::{MessageRecord, Payload, RecordError};
