//! Text envelopes for binary transactions.
//!
//! Binary transactions travel through CLI arguments and terminals, which
//! only carry printable text. [`Envelope::Base64`] (standard alphabet,
//! canonical padding) is the default; [`Envelope::Hex`] is accepted where a
//! user pastes hex from a block explorer.
//!
//! `wrap` is total. `unwrap` fails with [`CodecError::InvalidEncoding`] on
//! characters outside the alphabet or on bad padding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{CodecError, Result};

/// A reversible bytes-to-text mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Envelope {
    /// RFC 4648 base64, standard alphabet, `=` padding required.
    #[default]
    Base64,
    /// Lower-case hex on output; either case accepted on input.
    Hex,
}

impl Envelope {
    pub fn wrap(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    pub fn unwrap(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => STANDARD
                .decode(text.as_bytes())
                .map_err(|e| CodecError::InvalidEncoding(format!("base64: {}", e))),
            Self::Hex => hex::decode(text)
                .map_err(|e| CodecError::InvalidEncoding(format!("hex: {}", e))),
        }
    }
}

/// Base64-wraps `bytes`.
pub fn wrap(bytes: &[u8]) -> String {
    Envelope::Base64.wrap(bytes)
}

/// Unwraps base64 `text`.
pub fn unwrap(text: &str) -> Result<Vec<u8>> {
    Envelope::Base64.unwrap(text)
}
