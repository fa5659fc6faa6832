//! Value types carried inside a transaction.
//!
//! These are the pieces the codecs must preserve exactly: coins, opaque
//! messages, signer metadata, and the fee. None of them interpret message
//! contents or keys; that belongs to whoever built the transaction.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::serde_fmt::{base64_bytes, decimal};
use super::validation::ValidationError;
use crate::config::is_valid_denom;

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An integer amount of a single denomination.
///
/// `amount` is always in the smallest unit of `denom`. No floating point
/// anywhere near money.
///
/// # Examples
///
/// ```
/// use txwire_protocol::transaction::types::Coin;
///
/// let fee = Coin::new("atom", 150);
/// assert_eq!(fee.to_string(), "150atom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coin {
    /// Denomination, e.g. `atom` or `ibc/27394F...`.
    pub denom: String,
    /// Amount in the smallest unit, rendered as a decimal string in JSON.
    #[serde(with = "decimal")]
    pub amount: u128,
}

impl Coin {
    /// Creates a coin without validating it. See [`Coin::validate`].
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Checks the denom format and that the amount is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_denom(&self.denom) {
            return Err(ValidationError::InvalidDenom {
                denom: self.denom.clone(),
            });
        }
        if self.amount == 0 {
            return Err(ValidationError::ZeroAmount {
                denom: self.denom.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ---------------------------------------------------------------------------
// Coins
// ---------------------------------------------------------------------------

/// A canonical coin list: sorted by denom, no duplicates, no zero amounts.
///
/// [`Coins::new`] sorts its input. Decoding does not: a decoded list in the
/// wrong order is rejected by [`Coins::validate`] rather than silently
/// reordered, so the canonical bytes of a transaction never depend on how
/// it was parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Sorts the coins by denom and validates the result.
    pub fn new(mut coins: Vec<Coin>) -> Result<Self, ValidationError> {
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        let coins = Self(coins);
        coins.validate()?;
        Ok(coins)
    }

    /// An empty coin list.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wraps coins exactly as given. Used by decoders, which validate
    /// afterwards.
    pub(crate) fn from_vec_unchecked(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    /// Checks every coin, then that denoms are strictly increasing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for coin in &self.0 {
            coin.validate()?;
        }
        for pair in self.0.windows(2) {
            match pair[0].denom.cmp(&pair[1].denom) {
                std::cmp::Ordering::Less => {}
                std::cmp::Ordering::Equal => {
                    return Err(ValidationError::DuplicateDenom {
                        denom: pair[1].denom.clone(),
                    })
                }
                std::cmp::Ordering::Greater => {
                    return Err(ValidationError::UnsortedCoins {
                        previous: pair[0].denom.clone(),
                        next: pair[1].denom.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Returns the amount of `denom`, or zero if absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Coin] {
        &self.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Any
// ---------------------------------------------------------------------------

/// An opaque, type-tagged payload: a message or a public key.
///
/// The codec never looks inside `value`; it only guarantees the bytes come
/// back exactly as they went in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Any {
    /// Type identifier, e.g. `/cosmos.bank.v1beta1.MsgSend`.
    #[serde(rename = "@type")]
    pub type_url: String,
    /// Encoded payload, base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl Any {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// SignMode
// ---------------------------------------------------------------------------

/// How a signer produced its signature. Carried through the codec only;
/// signatures are never verified here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignMode {
    #[default]
    #[serde(rename = "SIGN_MODE_UNSPECIFIED")]
    Unspecified,
    /// Signature over the canonical binary body and auth info.
    #[serde(rename = "SIGN_MODE_DIRECT")]
    Direct,
    /// Signature over a human-readable rendering.
    #[serde(rename = "SIGN_MODE_TEXTUAL")]
    Textual,
    /// Direct signing by an auxiliary (non-fee-paying) signer.
    #[serde(rename = "SIGN_MODE_DIRECT_AUX")]
    DirectAux,
    /// Signature over the legacy sorted-key JSON rendering.
    #[serde(rename = "SIGN_MODE_LEGACY_AMINO_JSON")]
    LegacyAminoJson,
}

impl SignMode {
    /// Wire code used by the binary codec.
    pub fn code(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::Direct => 1,
            Self::Textual => 2,
            Self::DirectAux => 3,
            Self::LegacyAminoJson => 127,
        }
    }

    /// Inverse of [`SignMode::code`]. `None` for unassigned codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Direct),
            2 => Some(Self::Textual),
            3 => Some(Self::DirectAux),
            127 => Some(Self::LegacyAminoJson),
            _ => None,
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "SIGN_MODE_UNSPECIFIED"),
            Self::Direct => write!(f, "SIGN_MODE_DIRECT"),
            Self::Textual => write!(f, "SIGN_MODE_TEXTUAL"),
            Self::DirectAux => write!(f, "SIGN_MODE_DIRECT_AUX"),
            Self::LegacyAminoJson => write!(f, "SIGN_MODE_LEGACY_AMINO_JSON"),
        }
    }
}

// ---------------------------------------------------------------------------
// SignerInfo
// ---------------------------------------------------------------------------

/// Metadata about one signer, positionally matched to `Tx::signatures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignerInfo {
    /// The signer's public key. May be omitted when the chain already
    /// knows it.
    #[serde(default)]
    pub public_key: Option<Any>,
    #[serde(default)]
    pub sign_mode: SignMode,
    /// Account sequence the signature commits to.
    #[serde(default, with = "decimal")]
    pub sequence: u64,
}

// ---------------------------------------------------------------------------
// Fee
// ---------------------------------------------------------------------------

/// Fee paid for a transaction and the gas it may consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fee {
    pub amount: Coins,
    /// Maximum gas; rendered as a decimal string in JSON.
    #[serde(with = "decimal")]
    pub gas_limit: u64,
    /// Fee payer address. Empty means the first signer pays.
    #[serde(default)]
    pub payer: String,
    /// Fee granter address. Empty means no grant.
    #[serde(default)]
    pub granter: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
