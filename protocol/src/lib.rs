// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txwire — Transaction Codecs
//!
//! A transaction has two canonical forms: a compact binary wire form and a
//! structured JSON form. This crate converts between them without loss, and
//! wraps the binary form in base64 so it can travel through terminals and
//! command lines.
//!
//! ## Architecture
//!
//! - **transaction** — The [`Tx`](transaction::Tx) value, its builder, and its invariants.
//! - **codec** — Binary, JSON, text-envelope, and display codecs, bundled as a
//!   [`CodecSet`](codec::CodecSet).
//! - **pipeline** — The encode (JSON → base64) and decode (base64 → JSON)
//!   runs, with all-or-nothing output and cooperative cancellation.
//! - **error** — [`CodecError`](error::CodecError) and the pipeline stage each
//!   failure belongs to.
//! - **config** — Wire constants and the runtime [`CodecConfig`](config::CodecConfig).
//!
//! ## Example
//!
//! ```
//! use txwire_protocol::codec::{CodecSet, Envelope};
//! use txwire_protocol::pipeline::{DecodeOutput, Pipeline};
//! use txwire_protocol::transaction::Coin;
//!
//! let codecs = CodecSet::default();
//! let tx = codecs
//!     .new_builder()
//!     .set_gas_limit(50_000)
//!     .set_fee_amount(vec![Coin::new("atom", 150)])
//!     .set_memo("foomemo")
//!     .build()
//!     .unwrap();
//!
//! let json = codecs.json().to_json(&tx).unwrap();
//! let pipeline = Pipeline::new(&codecs);
//! let base64 = pipeline.encode_json(json.as_slice()).unwrap();
//! let back = pipeline
//!     .decode_text(&base64, Envelope::Base64, DecodeOutput::Json)
//!     .unwrap();
//! assert_eq!(back.as_bytes(), json.as_slice());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod transaction;

pub use codec::CodecSet;
pub use error::{CodecError, Stage};
pub use transaction::{Tx, TxBuilder};
