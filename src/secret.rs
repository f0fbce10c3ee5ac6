//! Scrubbed storage for sensitive strings.
//!
//! `SecretString` owns a string whose bytes are overwritten with random data
//! before the allocation is released. The overwrite runs from `Drop`, so it
//! happens on every exit path of the owner, including early error returns.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use std::sync::atomic::{compiler_fence, Ordering};

/// A heap string that is scrubbed with random bytes when dropped.
#[derive(Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps an owned string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        scrub_string(&mut self.0);
    }
}

/// Overwrites the buffer with random bytes.
pub fn scrub_bytes(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    rand::rng().fill_bytes(buf);
    // Keep the writes from being elided as dead stores before deallocation.
    compiler_fence(Ordering::SeqCst);
    std::hint::black_box(&*buf);
}

/// Scrubs and releases the contents of a string, leaving it empty.
///
/// The string is converted into its byte vector first so the random bytes
/// never have to be valid UTF-8.
pub fn scrub_string(value: &mut String) {
    let mut bytes = std::mem::take(value).into_bytes();
    scrub_vec(&mut bytes);
}

/// Scrubs the whole allocation of a byte vector, spare capacity included.
fn scrub_vec(bytes: &mut Vec<u8>) {
    // Stays within capacity, so the buffer is never reallocated.
    bytes.resize(bytes.capacity(), 0);
    scrub_bytes(bytes);
}

/// Serializes a secret verbatim. Used only for fields that must be echoed.
pub fn serialize_exposed<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose())
}
