//! Fuzz target for [`CipherCodec`] decoding
//!
//! Hardens the fail-open read path against adversarial log content
//!
//! # Strategy
//!
//! - Arbitrary strings: truncated blocks, wide code points, embedded
//!   NULs, valid-looking ciphertext
//! - Key split: decode under a different key than the one that encoded
//!
//! # Invariants
//!
//! - `decode` NEVER panics, whatever the input
//! - `decode` returns the input unchanged exactly when `try_decode`
//!   errors
//! - `try_decode(encode(x))` always succeeds and returns `x`
//! - `encode` output stays within the byte-preserving range

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veilchat_crypto::{CipherCodec, KEY_SIZE};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    key: [u8; KEY_SIZE],
    other_key: [u8; KEY_SIZE],
    text: String,
}

fuzz_target!(|input: FuzzInput| {
    let codec = CipherCodec::new(&input.key).expect("16-byte key is always valid");

    // Fail-open decode is total and consistent with the strict path.
    let decoded = codec.decode(&input.text);
    match codec.try_decode(&input.text) {
        Ok(plain) => assert_eq!(decoded, plain),
        Err(_) => assert_eq!(decoded, input.text),
    }

    // Round trip under the encoding key.
    let encoded = codec.encode(&input.text);
    assert!(encoded.chars().all(|ch| u32::from(ch) <= 0xFF));
    assert_eq!(codec.try_decode(&encoded).expect("own ciphertext must decode"), input.text);

    // A mismatched key must degrade, never panic.
    let other = CipherCodec::new(&input.other_key).expect("16-byte key is always valid");
    let _ = other.decode(&encoded);
    let _ = other.decode(&input.text);
});
