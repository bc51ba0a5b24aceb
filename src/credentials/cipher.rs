//! Keyed repeating-XOR transform for stored organization credentials.
//!
//! This is NOT AES. The historical storage format XORs every byte of the
//! block-padded plaintext with a SHA-256 digest of the shared secret and
//! stores the result as base64 with `+`/`/` swapped for `@`/`_`. It must be
//! reproduced bit for bit or existing rows become unreadable.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Block size used for padding (bytes)
pub const BLOCK_SIZE: usize = 32;

/// Reasons a stored value could not be decoded.
///
/// Never surfaced to callers of the login path: the verifier turns any of
/// these into the plaintext fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("encoded credential is empty")]
    Empty,

    #[error("encoded credential is not valid base64")]
    Base64,

    #[error("padding byte {0} outside 1..=32")]
    BadPadding(u8),

    #[error("padding length exceeds decoded length")]
    PaddingOverrun,
}

/// Reversible credential cipher keyed by a shared secret.
///
/// The derived key is immutable once built, so a single instance can be
/// shared across threads without locking.
#[derive(Clone)]
pub struct XorCipher {
    key: [u8; BLOCK_SIZE],
}

impl XorCipher {
    /// Derive the working key as SHA-256(secret).
    pub fn new(secret: &str) -> Self {
        let key: [u8; BLOCK_SIZE] = Sha256::digest(secret.as_bytes()).into();
        Self { key }
    }

    /// Encode a plaintext credential into its storage form.
    ///
    /// Every step here is infallible, so unlike `decode` there is no
    /// fail-open path to take.
    pub fn encode(&self, plaintext: &str) -> String {
        let mut buf = pad(plaintext.as_bytes());
        self.apply_keystream(&mut buf);

        let encoded = to_storage_alphabet(&BASE64.encode(&buf));
        debug!(
            plain_len = plaintext.len(),
            padded_len = buf.len(),
            "Credential encoded"
        );
        encoded
    }

    /// Decode a stored credential, returning the input unchanged on failure.
    pub fn decode(&self, encoded: &str) -> String {
        match self.try_decode(encoded) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                debug!(error = %e, "Credential decode failed, returning input unchanged");
                encoded.to_string()
            }
        }
    }

    /// Decode a stored credential, reporting why it failed.
    pub fn try_decode(&self, encoded: &str) -> Result<String, DecodeError> {
        if encoded.is_empty() {
            return Err(DecodeError::Empty);
        }

        // Characters outside the base64 alphabet (stray whitespace included)
        // were always ignored when reading stored values
        let standard: String = from_storage_alphabet(encoded)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '+' | '/' | '='))
            .collect();
        let mut buf = BASE64.decode(standard).map_err(|_| DecodeError::Base64)?;
        if buf.is_empty() {
            return Err(DecodeError::Empty);
        }
        debug!(decoded_len = buf.len(), "Credential base64 decoded");

        self.apply_keystream(&mut buf);
        let plain_len = unpad_len(&buf)?;
        buf.truncate(plain_len);

        debug!(plain_len, "Credential unpadded");
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// XOR in place. Byte `i` of the whole buffer pairs with `key[i % 32]`.
    fn apply_keystream(&self, buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte ^= self.key[i % self.key.len()];
        }
    }
}

/// Block padding: always adds 1..=32 bytes, each holding the pad length.
fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Length of the payload once the trailing padding is dropped.
fn unpad_len(data: &[u8]) -> Result<usize, DecodeError> {
    let last = *data.last().ok_or(DecodeError::Empty)?;
    let pad_len = last as usize;

    if pad_len == 0 || pad_len > BLOCK_SIZE {
        return Err(DecodeError::BadPadding(last));
    }
    if pad_len > data.len() {
        return Err(DecodeError::PaddingOverrun);
    }

    Ok(data.len() - pad_len)
}

pub(super) fn to_storage_alphabet(s: &str) -> String {
    s.replace('+', "@").replace('/', "_")
}

pub(super) fn from_storage_alphabet(s: &str) -> String {
    s.replace('@', "+").replace('_', "/")
}
