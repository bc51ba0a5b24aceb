//! Stored organization credentials.
//!
//! Organizations keep their password in an encoded column. This module
//! recovers and checks it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       CredentialVerifier                 │
//! │  - salted / unsalted / plaintext tiers   │
//! │  - salt check against expected salt      │
//! └─────────────────────────────────────────┘
//!          ↓                    ↑
//!    (try_decode)          (plaintext)
//!          ↓                    ↑
//! ┌─────────────────────────────────────────┐
//! │       XorCipher                          │
//! │  - SHA-256(secret) key                   │
//! │  - block padding + repeating XOR         │
//! │  - base64 with @ and _ substitutions     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use slimsite::credentials::{CredentialVerifier, Verdict, XorCipher};
//!
//! let verifier = CredentialVerifier::new(XorCipher::new("cipher-secret"));
//! let stored = verifier.seal("basecamp", "hunter2");
//!
//! assert_eq!(verifier.verify(&stored, "hunter2", "basecamp"), Verdict::Match);
//! assert_eq!(verifier.verify(&stored, "nope", "basecamp"), Verdict::PasswordMismatch);
//! ```
//!
//! # Security
//!
//! - The transform is a repeating-key XOR, not AES. It obscures values at
//!   rest and nothing more.
//! - Decoded credentials live only for one verification call and are never
//!   logged.

mod cipher;
mod verifier;


pub use cipher::{DecodeError, XorCipher, BLOCK_SIZE};
pub use verifier::{CredentialVerifier, StoredFormat, Verdict, SALT_SEPARATOR};
