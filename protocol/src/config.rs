//! # Codec Configuration & Constants
//!
//! Every wire-format constant lives here. The binary layout, the size limits
//! enforced on decode, and the coin denomination rules are all defined in
//! one place so the codecs and the validator cannot drift apart.
//!
//! Changing any of the wire constants changes the canonical byte form of
//! every transaction, which in turn changes every transaction hash. Bump
//! [`WIRE_FORMAT_VERSION`] if you do.

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Magic bytes that open every canonical binary transaction. Lets the
/// decoder reject foreign input before reading any length prefix.
pub const WIRE_MAGIC: [u8; 4] = *b"TXWR";

/// Version of the canonical binary layout. The decoder accepts exactly this
/// version; there is no cross-version negotiation.
pub const WIRE_FORMAT_VERSION: u16 = 1;

/// Crate-level protocol version string, printed by `txwire version`.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Field tag preceding the transaction body.
pub const TAG_BODY: u8 = 0x01;

/// Field tag preceding the auth info (signers and fee).
pub const TAG_AUTH_INFO: u8 = 0x02;

/// Field tag preceding the signature list.
pub const TAG_SIGNATURES: u8 = 0x03;

/// Smallest possible canonical transaction: magic, version, three tags, and
/// every length/count/integer field at its minimum width.
///
/// 4 (magic) + 2 (version)
/// + 1 + 4 + 8 + 4 (body: tag, memo len, timeout, message count)
/// + 1 + 4 + 4 + 8 + 4 + 4 (auth info: tag, signers, coins, gas, payer, granter)
/// + 1 + 4 (signatures: tag, count)
pub const MIN_TX_BYTES: usize = 53;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum encoded transaction size in bytes. Applies to the binary form on
/// decode and to the JSON source on encode.
pub const MAX_TX_SIZE_BYTES: usize = 256 * 1024;

/// Maximum memo length in bytes.
pub const MAX_MEMO_LENGTH: usize = 256;

/// Maximum number of messages per transaction.
pub const MAX_MESSAGES: usize = 256;

/// Maximum number of signer infos, and of signatures, per transaction.
pub const MAX_SIGNERS: usize = 64;

/// Maximum number of distinct coins in a fee.
pub const MAX_FEE_COINS: usize = 32;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Minimum denom length (inclusive).
pub const MIN_DENOM_LENGTH: usize = 3;

/// Maximum denom length (inclusive).
pub const MAX_DENOM_LENGTH: usize = 128;

/// Punctuation allowed after the first character of a denom, alongside
/// ASCII letters and digits.
pub const DENOM_PUNCTUATION: &[char] = &['/', ':', '.', '_', '-'];

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Runtime knobs handed to a [`crate::codec::CodecSet`] at construction.
///
/// There is no global configuration: whoever assembles the codec set decides
/// the limits and passes them in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Upper bound on binary input to decode and on JSON input to encode.
    pub max_tx_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_tx_bytes: MAX_TX_SIZE_BYTES,
        }
    }
}

impl CodecConfig {
    /// Overrides the maximum transaction size. Values below
    /// [`MIN_TX_BYTES`] are raised to it, since nothing smaller can decode.
    pub fn with_max_tx_bytes(mut self, max_tx_bytes: usize) -> Self {
        self.max_tx_bytes = max_tx_bytes.max(MIN_TX_BYTES);
        self
    }
}

/// Returns `true` if `denom` is a well-formed coin denomination:
/// `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn is_valid_denom(denom: &str) -> bool {
    let len = denom.len();
    if !(MIN_DENOM_LENGTH..=MAX_DENOM_LENGTH).contains(&len) {
        return false;
    }
    let mut chars = denom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || DENOM_PUNCTUATION.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_is_ascii() {
        assert!(WIRE_MAGIC.iter().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_tags_are_distinct() {
        assert_ne!(TAG_BODY, TAG_AUTH_INFO);
        assert_ne!(TAG_AUTH_INFO, TAG_SIGNATURES);
        assert_ne!(TAG_BODY, TAG_SIGNATURES);
    }

    #[test]
    fn test_min_tx_bytes_sum() {
        let header = WIRE_MAGIC.len() + 2;
        let body = 1 + 4 + 8 + 4;
        let auth_info = 1 + 4 + 4 + 8 + 4 + 4;
        let signatures = 1 + 4;
        assert_eq!(MIN_TX_BYTES, header + body + auth_info + signatures);
    }

    #[test]
    fn test_valid_denoms() {
        assert!(is_valid_denom("atom"));
        assert!(is_valid_denom("uatom"));
        assert!(is_valid_denom("ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"));
        assert!(is_valid_denom("factory/osmo1abc/token.v2"));
    }

    #[test]
    fn test_invalid_denoms() {
        assert!(!is_valid_denom(""));
        assert!(!is_valid_denom("ab"));
        assert!(!is_valid_denom("1atom"));
        assert!(!is_valid_denom("at om"));
        assert!(!is_valid_denom("atom!"));
        assert!(!is_valid_denom(&"a".repeat(MAX_DENOM_LENGTH + 1)));
    }

    #[test]
    fn test_config_floor() {
        let config = CodecConfig::default().with_max_tx_bytes(1);
        assert_eq!(config.max_tx_bytes, MIN_TX_BYTES);
        assert_eq!(CodecConfig::default().max_tx_bytes, MAX_TX_SIZE_BYTES);
    }
}
