use super::cipher::XorCipher;
use tracing::debug;

/// Separator between salt and password inside a decoded credential
pub const SALT_SEPARATOR: char = '|';

/// Outcome of comparing a supplied password with a stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    SaltMismatch,
    PasswordMismatch,
}

/// Which historical storage format a stored credential was read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredFormat {
    /// Decoded to `salt|password`
    Salted,
    /// Decoded, but without a separator
    Unsalted,
    /// Could not be decoded; compared as stored plaintext
    Plaintext,
}

/// Compares supplied passwords against encoded credentials.
///
/// Formats are tried in a fixed order: salted-decoded, unsalted-decoded,
/// then raw plaintext when decoding fails. Rows written under any of the
/// three historical formats keep working.
#[derive(Clone)]
pub struct CredentialVerifier {
    cipher: XorCipher,
}

impl CredentialVerifier {
    pub fn new(cipher: XorCipher) -> Self {
        Self { cipher }
    }

    pub fn cipher(&self) -> &XorCipher {
        &self.cipher
    }

    /// Verify `supplied` against `stored`.
    ///
    /// An empty `expected_salt` disables the salt check.
    pub fn verify(&self, stored: &str, supplied: &str, expected_salt: &str) -> Verdict {
        self.verify_detailed(stored, supplied, expected_salt).1
    }

    /// Like `verify`, also reporting which storage format was matched against.
    pub fn verify_detailed(
        &self,
        stored: &str,
        supplied: &str,
        expected_salt: &str,
    ) -> (StoredFormat, Verdict) {
        let decoded = match self.cipher.try_decode(stored) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = %e, "Stored credential not decodable, comparing as plaintext");
                return (StoredFormat::Plaintext, compare(stored, supplied));
            }
        };

        match decoded.split_once(SALT_SEPARATOR) {
            Some((salt, real_password)) => {
                if !expected_salt.is_empty() && salt != expected_salt {
                    return (StoredFormat::Salted, Verdict::SaltMismatch);
                }
                (StoredFormat::Salted, compare(real_password, supplied))
            }
            None => (StoredFormat::Unsalted, compare(&decoded, supplied)),
        }
    }

    /// Produce the stored form of `password` under `salt`.
    ///
    /// An empty salt writes the unsalted format.
    pub fn seal(&self, salt: &str, password: &str) -> String {
        if salt.is_empty() {
            self.cipher.encode(password)
        } else {
            self.cipher.encode(&format!("{}{}{}", salt, SALT_SEPARATOR, password))
        }
    }
}

fn compare(expected: &str, supplied: &str) -> Verdict {
    if expected == supplied {
        Verdict::Match
    } else {
        Verdict::PasswordMismatch
    }
}
