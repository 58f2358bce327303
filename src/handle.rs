//! Article handles.
//!
//! Row identifiers never appear in URLs as plain numbers. A handle is the
//! big-endian byte form of the `u64` identifier, encoded with the URL-safe
//! base64 alphabet (`A-Z a-z 0-9 - _`) and no padding. This is obfuscation,
//! not security.

use base64::{
    alphabet,
    engine::{general_purpose, GeneralPurpose},
    Engine as _,
};
use thiserror::Error;

/// Length of an encoded full 8-byte identifier.
pub const MAX_HANDLE_LEN: usize = 11;

const ENGINE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("handle decodes to {0} bytes, at most 8 allowed")]
    Oversized(usize),

    #[error("malformed handle: {0}")]
    Malformed(#[from] base64::DecodeError),

    /// The path segment could not be read as text at all.
    #[error("unreadable handle: {0}")]
    Unreadable(String),
}

/// Maps row identifiers to URL path segments and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleCodec;

impl HandleCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, value: u64) -> String {
        ENGINE.encode(value.to_be_bytes())
    }

    /// Decodes a handle produced by [`HandleCodec::encode`].
    ///
    /// Shorter inputs are accepted and zero-padded on the left, so `""`
    /// decodes to `0`. Anything outside the alphabet, or anything that would
    /// need more than 8 bytes, is rejected instead of truncated. Every
    /// input longer than [`MAX_HANDLE_LEN`] falls in one of those cases.
    pub fn decode(&self, text: &str) -> Result<u64, HandleError> {
        let bytes = ENGINE.decode(text)?;
        if bytes.len() > 8 {
            return Err(HandleError::Oversized(bytes.len()));
        }

        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(&bytes);
        Ok(u64::from_be_bytes(buf))
    }
}
