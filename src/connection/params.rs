//! Connection-string parsing.
//!
//! Connection strings are `;`-separated `key=value` tokens, for example
//! `Server=db.local;Port=5432;Database=app;Uid=reader;Pwd=secret`.
//! Keys are case-insensitive and may be surrounded by whitespace. Any key
//! outside the recognized set rejects the whole string.

use crate::error::{ProbeError, Result};
use crate::numeric::leading_integer;
use crate::secret::SecretString;
use std::time::Duration;
use tracing::debug;

/// Connect timeout in seconds used when none is given or it cannot be parsed.
pub const DEFAULT_CONNECT_TIMEOUT: u32 = 30;

/// Parameters extracted from a connection string.
///
/// Every string field is a `SecretString`, so the whole record is scrubbed
/// when it goes out of scope.
#[derive(Debug)]
pub struct ConnectionParameters {
    pub host: Option<SecretString>,
    pub port: Option<SecretString>,
    pub user: Option<SecretString>,
    pub password: Option<SecretString>,
    pub database: Option<SecretString>,
    /// Connect timeout in seconds.
    pub connect_timeout: u32,
}

/// Recognized connection-string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Server,
    Port,
    Pwd,
    Database,
    Uid,
    ConnectTimeout,
}

impl Key {
    /// Matches a key by its first character, then the exact remainder.
    fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let first = chars.next()?.to_ascii_lowercase();
        let rest = chars.as_str();

        let candidates: &[(&str, Key)] = match first {
            's' => &[("erver", Key::Server)],
            'p' => &[("ort", Key::Port), ("wd", Key::Pwd)],
            'd' => &[("atabase", Key::Database)],
            'u' => &[("id", Key::Uid)],
            'c' => &[("onnecttimeout", Key::ConnectTimeout)],
            _ => &[],
        };

        candidates
            .iter()
            .find(|(tail, _)| tail.eq_ignore_ascii_case(rest))
            .map(|(_, key)| *key)
    }
}

impl ConnectionParameters {
    /// Creates an empty parameter set with the given connect timeout.
    pub fn new(connect_timeout: u32) -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            connect_timeout,
        }
    }

    /// Parses a connection string using the default connect timeout.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_with_default(raw, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Parses a connection string, falling back to `default_timeout` when the
    /// `connecttimeout` key is absent or unusable.
    ///
    /// On failure nothing is returned; the partially filled record is dropped
    /// and scrubbed here.
    pub fn parse_with_default(raw: &str, default_timeout: u32) -> Result<Self> {
        let mut params = Self::new(default_timeout);

        for (index, token) in raw.split(';').enumerate() {
            if token.trim().is_empty() {
                continue;
            }

            let (name, value) = token.split_once('=').ok_or_else(|| {
                ProbeError::malformed(format!("token {} has no '=' separator", index + 1))
            })?;

            let name = name.trim_end();
            let key = Key::parse(name)
                .ok_or_else(|| ProbeError::malformed(format!("unrecognized key '{name}'")))?;

            params.assign(key, value, default_timeout);
        }

        Ok(params)
    }

    fn assign(&mut self, key: Key, raw: &str, default_timeout: u32) {
        let slot = match key {
            Key::Server => &mut self.host,
            Key::Port => &mut self.port,
            Key::Pwd => &mut self.password,
            Key::Database => &mut self.database,
            Key::Uid => &mut self.user,
            Key::ConnectTimeout => {
                self.connect_timeout = parse_timeout(raw, default_timeout);
                return;
            }
        };
        // Replacing drops, and so scrubs, any earlier value for the key.
        *slot = Some(SecretString::from(raw));
    }

    /// Returns the connect timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout))
    }

    /// Returns `host:port` for diagnostics.
    pub fn endpoint(&self) -> String {
        let host = self.host.as_ref().map(SecretString::expose).unwrap_or("");
        let port = self.port.as_ref().map(SecretString::expose).unwrap_or("");
        format!("{host}:{port}")
    }
}

fn parse_timeout(raw: &str, default_timeout: u32) -> u32 {
    let parsed = leading_integer(raw);
    if parsed.is_empty() || parsed.overflow {
        debug!("Unusable connect timeout, using default of {default_timeout}s");
        return default_timeout;
    }

    u32::try_from(parsed.value).unwrap_or_else(|_| {
        debug!("Connect timeout out of range, using default of {default_timeout}s");
        default_timeout
    })
}
