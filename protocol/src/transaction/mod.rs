//! # Transaction Module
//!
//! The in-memory transaction value shared by every codec. A [`Tx`] carries
//! a body (messages, memo, timeout), auth info (signer metadata and fee),
//! and a list of opaque signatures.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      — Coin, Coins, Any, SignMode, SignerInfo, Fee
//! builder.rs    — Tx and the fluent TxBuilder
//! validation.rs — Structural invariants shared by builder and decoders
//! serde_fmt.rs  — JSON field formats (decimal strings, base64 bytes)
//! ```
//!
//! ## Design Decisions
//!
//! - Amounts are `u128` and gas is `u64`. Negative values are unrepresentable.
//! - The value does not interpret messages or keys. It only guarantees that
//!   the bytes it was given are the bytes every codec gets back.
//! - Invariants are checked in one place, [`validation::validate_tx`], and
//!   reported in whatever error kind fits the caller's stage.

pub mod builder;
mod serde_fmt;
pub mod types;
pub mod validation;

pub use builder::{AuthInfo, Tx, TxBody, TxBuilder};
pub use types::{Any, Coin, Coins, Fee, SignMode, SignerInfo};
pub use validation::ValidationError;
