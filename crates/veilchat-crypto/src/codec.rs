//! AES record codec.
//!
//! Records are scrambled field-by-field with AES-128 in ECB mode and
//! PKCS#7 padding, then mapped into strings one code point per byte so
//! the ciphertext can live in the same string-typed log fields as
//! plaintext records.
//!
//! # Invariants
//!
//! - Encoding is deterministic: same key + same input = same output
//! - `encode` output always satisfies the byte-preserving mapping, so
//!   `try_decode(encode(x))` never fails structurally
//! - `decode` never fails: undecryptable input is returned unchanged

use aes::{
    Aes128,
    cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, block_padding::Pkcs7},
};
use ecb::{Decryptor, Encryptor};
use thiserror::Error;

/// Required key length in bytes (AES-128).
pub const KEY_SIZE: usize = 16;

/// Errors from codec construction and strict decoding.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The provided key is not exactly [`KEY_SIZE`] bytes.
    #[error("invalid key length: expected 16 bytes, got {len}")]
    InvalidKeyLength {
        /// Length of the rejected key.
        len: usize,
    },

    /// Input contains a code point above U+00FF and cannot be a
    /// byte-preserving ciphertext string.
    #[error("code point {code_point:#06x} is outside the byte-preserving range")]
    NotByteEncoded {
        /// The offending code point.
        code_point: u32,
    },

    /// Ciphertext length is not a whole number of blocks, or the
    /// padding is invalid after decryption.
    #[error("ciphertext has invalid length or padding")]
    Malformed,
}

/// Symmetric codec over a fixed 16-byte key.
///
/// Cloning is cheap; every pipeline stage that needs the cipher holds
/// its own copy.
#[derive(Clone)]
pub struct CipherCodec {
    key: [u8; KEY_SIZE],
}

impl CipherCodec {
    /// Create a codec from a raw key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `key` is not exactly
    /// [`KEY_SIZE`] bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_SIZE] =
            key.try_into().map_err(|_| CipherError::InvalidKeyLength { len: key.len() })?;
        Ok(Self { key })
    }

    /// Encrypt a plaintext string into a byte-preserving ciphertext
    /// string.
    ///
    /// The plaintext is encrypted as UTF-8 bytes and the resulting
    /// ciphertext bytes are mapped one code point per byte. The output
    /// is always a whole number of 16-byte blocks, so it is never equal
    /// in length to the input.
    pub fn encode(&self, plain: &str) -> String {
        let cipher_bytes = Encryptor::<Aes128>::new(&self.key.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plain.as_bytes());
        text_from_bytes(&cipher_bytes)
    }

    /// Decrypt a ciphertext string, passing undecryptable input through
    /// unchanged.
    ///
    /// This is the fail-open entry point used on the read path: a log
    /// may contain records written before encryption was enabled, and
    /// those must remain readable as-is.
    pub fn decode(&self, text: &str) -> String {
        match self.try_decode(text) {
            Ok(plain) => plain,
            Err(_) => text.to_owned(),
        }
    }

    /// Decrypt a ciphertext string, reporting why decryption failed.
    ///
    /// Decrypted bytes are reconstructed as UTF-8 with replacement
    /// characters for invalid sequences, so a structurally valid
    /// ciphertext always yields some string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NotByteEncoded`] if `text` contains a code
    /// point above U+00FF, or [`CipherError::Malformed`] if the mapped
    /// bytes are not a whole number of blocks or the padding check
    /// fails.
    pub fn try_decode(&self, text: &str) -> Result<String, CipherError> {
        let cipher_bytes = bytes_from_text(text)?;
        let plain_bytes = Decryptor::<Aes128>::new(&self.key.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&cipher_bytes)
            .map_err(|_| CipherError::Malformed)?;
        Ok(String::from_utf8_lossy(&plain_bytes).into_owned())
    }
}

impl std::fmt::Debug for CipherCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherCodec").field("key", &"<redacted 16 bytes>").finish()
    }
}

/// Map ciphertext bytes into a string, one code point per byte.
fn text_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Recover ciphertext bytes from a byte-preserving string.
fn bytes_from_text(text: &str) -> Result<Vec<u8>, CipherError> {
    text.chars()
        .map(|ch| {
            u8::try_from(u32::from(ch))
                .map_err(|_| CipherError::NotByteEncoded { code_point: u32::from(ch) })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    const TEST_KEY: [u8; KEY_SIZE] = hex!("000102030405060708090a0b0c0d0e0f");
    const OTHER_KEY: [u8; KEY_SIZE] = hex!("ffeeddccbbaa99887766554433221100");

    fn codec() -> CipherCodec {
        CipherCodec::new(&TEST_KEY).unwrap()
    }

    #[test]
    fn new_rejects_short_key() {
        let err = CipherCodec::new(&[0u8; 8]).unwrap_err();
        assert!(matches!(err, CipherError::InvalidKeyLength { len: 8 }));
    }

    #[test]
    fn new_rejects_long_key() {
        let err = CipherCodec::new(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, CipherError::InvalidKeyLength { len: 32 }));
    }

    #[test]
    fn round_trip_ascii() {
        let codec = codec();
        assert_eq!(codec.decode(&codec.encode("hello, log")), "hello, log");
    }

    #[test]
    fn round_trip_empty() {
        let codec = codec();
        let encoded = codec.encode("");
        // Padding always emits at least one full block.
        assert_eq!(encoded.chars().count(), 16);
        assert_eq!(codec.decode(&encoded), "");
    }

    #[test]
    fn round_trip_multibyte() {
        let codec = codec();
        let plain = "ciao 🙂 你好";
        assert_eq!(codec.decode(&codec.encode(plain)), plain);
    }

    #[test]
    fn encode_is_deterministic() {
        let codec = codec();
        assert_eq!(codec.encode("same input"), codec.encode("same input"));
    }

    #[test]
    fn encode_output_is_byte_ranged() {
        let codec = codec();
        let encoded = codec.encode("any plaintext at all");
        assert!(encoded.chars().all(|ch| u32::from(ch) <= 0xFF));
    }

    #[test]
    fn encode_pads_to_whole_blocks() {
        let codec = codec();
        // 5 bytes of input round up to one block.
        assert_eq!(codec.encode("hello").chars().count(), 16);
        // A full block grows by one padding block.
        assert_eq!(codec.encode("exactly 16 bytes").chars().count(), 32);
    }

    #[test]
    fn identical_blocks_encrypt_identically() {
        // The defining leak of ECB mode: no IV means equal plaintext
        // blocks produce equal ciphertext blocks.
        let codec = codec();
        let encoded: Vec<char> = codec.encode(&"A".repeat(32)).chars().collect();
        assert_eq!(encoded.len(), 48);
        assert_eq!(encoded[..16], encoded[16..32]);
    }

    #[test]
    fn decode_passes_through_plaintext() {
        let codec = codec();
        // 20 chars, not a whole number of blocks.
        assert_eq!(codec.decode("not valid ciphertext"), "not valid ciphertext");
    }

    #[test]
    fn decode_passes_through_wide_chars() {
        let codec = codec();
        assert_eq!(codec.decode("emoji 🙂 stays"), "emoji 🙂 stays");
    }

    #[test]
    fn decode_passes_through_empty() {
        let codec = codec();
        assert_eq!(codec.decode(""), "");
    }

    #[test]
    fn decode_with_wrong_key_never_recovers_plaintext() {
        let plain = "a message long enough to span multiple cipher blocks";
        let encoded = CipherCodec::new(&TEST_KEY).unwrap().encode(plain);
        let decoded = CipherCodec::new(&OTHER_KEY).unwrap().decode(&encoded);
        assert_ne!(decoded, plain);
    }

    #[test]
    fn try_decode_reports_wide_chars() {
        let err = codec().try_decode("🙂").unwrap_err();
        assert!(matches!(err, CipherError::NotByteEncoded { code_point: 0x1F642 }));
    }

    #[test]
    fn try_decode_reports_partial_blocks() {
        let err = codec().try_decode("short").unwrap_err();
        assert!(matches!(err, CipherError::Malformed));
    }

    #[test]
    fn error_display() {
        let err = CipherError::InvalidKeyLength { len: 7 };
        assert_eq!(err.to_string(), "invalid key length: expected 16 bytes, got 7");
    }

    proptest! {
        #[test]
        fn round_trip_printable(plain in "[ -~]{0,1000}") {
            let codec = codec();
            prop_assert_eq!(codec.decode(&codec.encode(&plain)), plain);
        }

        #[test]
        fn round_trip_unicode(plain in "\\PC{0,200}") {
            let codec = codec();
            prop_assert_eq!(codec.decode(&codec.encode(&plain)), plain);
        }

        #[test]
        fn decode_agrees_with_try_decode(text in "\\PC{0,200}") {
            let codec = codec();
            let decoded = codec.decode(&text);
            match codec.try_decode(&text) {
                Ok(plain) => prop_assert_eq!(decoded, plain),
                Err(_) => prop_assert_eq!(decoded, text),
            }
        }

        #[test]
        fn encode_length_is_block_aligned(plain in "\\PC{0,200}") {
            let codec = codec();
            let encoded = codec.encode(&plain);
            let len = encoded.chars().count();
            prop_assert_eq!(len % 16, 0);
            prop_assert!(len > plain.len());
        }
    }
}
