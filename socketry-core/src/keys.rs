//! CURVE key and certificate containers.
//!
//! Keys are opaque 32-byte values. They are forwarded to the native socket
//! untouched; nothing here validates key material.

use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// CURVE key size in bytes
pub const CURVE_KEY_SIZE: usize = 32;

/// Length of a CURVE key in Z85 text form
pub const CURVE_KEY_Z85_LEN: usize = 40;

/// CURVE key (32 bytes), public or secret.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveKey([u8; CURVE_KEY_SIZE]);

impl CurveKey {
    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; CURVE_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Decode from the 40 character Z85 text form.
    pub fn from_z85(text: &str) -> std::result::Result<Self, KeyError> {
        if text.len() != CURVE_KEY_Z85_LEN {
            return Err(KeyError::InvalidLength(text.len()));
        }

        let decoded = zmq::z85_decode(text).map_err(|_| KeyError::InvalidEncoding)?;
        let bytes: [u8; CURVE_KEY_SIZE] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| KeyError::InvalidLength(v.len()))?;

        Ok(Self(bytes))
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; CURVE_KEY_SIZE] {
        &self.0
    }

    /// Encode as Z85 text.
    pub fn to_z85(&self) -> String {
        // 32 bytes is a multiple of four, which is all the encoder requires.
        zmq::z85_encode(&self.0).unwrap_or_default()
    }
}

impl From<[u8; CURVE_KEY_SIZE]> for CurveKey {
    fn from(bytes: [u8; CURVE_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CurveKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for CurveKey {
    type Err = KeyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_z85(s.trim())
    }
}

impl fmt::Display for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_z85())
    }
}

impl fmt::Debug for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurveKey({})", self.to_z85())
    }
}

/// A CURVE public key with an optional matching secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    public_key: CurveKey,
    private_key: Option<CurveKey>,
}

impl Certificate {
    /// Generate a new key pair with the native key generator.
    ///
    /// Fails with `NotSupported` when the transport was built without CURVE.
    pub fn generate() -> Result<Self> {
        let pair = zmq::CurveKeyPair::new()?;
        Ok(Self {
            public_key: CurveKey::from_bytes(pair.public_key),
            private_key: Some(CurveKey::from_bytes(pair.secret_key)),
        })
    }

    /// Certificate holding both halves of a key pair.
    pub fn from_keys(public_key: CurveKey, private_key: CurveKey) -> Self {
        Self {
            public_key,
            private_key: Some(private_key),
        }
    }

    /// Certificate holding only a peer's public key.
    pub fn from_public(public_key: CurveKey) -> Self {
        Self {
            public_key,
            private_key: None,
        }
    }

    /// The public key.
    pub fn public_key(&self) -> &CurveKey {
        &self.public_key
    }

    /// The secret key, if this certificate holds one.
    pub fn private_key(&self) -> Option<&CurveKey> {
        self.private_key.as_ref()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.map(|_| "<redacted>"))
            .finish()
    }
}

/// Errors that can occur when decoding keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid key length: {0}")]
    InvalidLength(usize),

    #[error("Invalid Z85 key encoding")]
    InvalidEncoding,
}
