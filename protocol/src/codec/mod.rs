//! # Codec Module
//!
//! Conversions between a [`Tx`] and its external forms.
//!
//! ```text
//! binary.rs   — canonical binary codec (WireCodec)
//! json.rs     — canonical JSON codec (StandardJson)
//! envelope.rs — base64 / hex text envelopes for the binary form
//! display.rs  — display-only legacy rendering (LegacyJsonDisplay)
//! ```
//!
//! The codecs are handed to callers as a [`CodecSet`]: an explicit bundle
//! built once from a [`CodecConfig`] and passed by reference to whatever
//! needs it. Nothing is looked up from global state.
//!
//! ## Laws
//!
//! For every valid `tx`:
//!
//! - `binary.decode(binary.encode(tx)) == tx`
//! - `json.from_json(json.to_json(tx)) == tx`
//! - `binary.encode(json.from_json(json.to_json(tx))) == binary.encode(tx)`

pub mod binary;
pub mod display;
pub mod envelope;
pub mod json;

use std::fmt;
use std::sync::Arc;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::transaction::{Tx, TxBuilder};

pub use binary::WireCodec;
pub use display::LegacyJsonDisplay;
pub use envelope::Envelope;
pub use json::StandardJson;

/// Canonical binary form of a transaction.
pub trait BinaryCodec: Send + Sync {
    /// Encodes `tx`. Deterministic: the same value always yields the same
    /// bytes.
    fn encode(&self, tx: &Tx) -> Vec<u8>;

    /// Parses canonical bytes back into a transaction.
    fn decode(&self, bytes: &[u8]) -> Result<Tx>;
}

/// Canonical JSON form of a transaction.
pub trait JsonCodec: Send + Sync {
    fn to_json(&self, tx: &Tx) -> Result<Vec<u8>>;

    /// Indented variant of [`JsonCodec::to_json`] for terminals. Parses to
    /// the same value.
    fn to_json_pretty(&self, tx: &Tx) -> Result<Vec<u8>>;

    fn from_json(&self, bytes: &[u8]) -> Result<Tx>;
}

/// A one-way, human-oriented rendering. Never used for round trips.
pub trait DisplayEncoder: Send + Sync {
    fn render(&self, tx: &Tx) -> Result<String>;
}

/// The codecs a pipeline runs with.
#[derive(Clone)]
pub struct CodecSet {
    binary: Arc<dyn BinaryCodec>,
    json: Arc<dyn JsonCodec>,
    display: Option<Arc<dyn DisplayEncoder>>,
    config: CodecConfig,
}

impl CodecSet {
    /// Assembles a set from explicit parts, with no display encoder.
    pub fn new(
        binary: Arc<dyn BinaryCodec>,
        json: Arc<dyn JsonCodec>,
        config: CodecConfig,
    ) -> Self {
        Self {
            binary,
            json,
            display: None,
            config,
        }
    }

    /// The stock set: [`WireCodec`], [`StandardJson`], and
    /// [`LegacyJsonDisplay`].
    pub fn standard(config: CodecConfig) -> Self {
        Self::new(
            Arc::new(WireCodec::new(&config)),
            Arc::new(StandardJson::new(&config)),
            config,
        )
        .with_display(Arc::new(LegacyJsonDisplay))
    }

    pub fn with_display(mut self, display: Arc<dyn DisplayEncoder>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn binary(&self) -> &dyn BinaryCodec {
        self.binary.as_ref()
    }

    pub fn json(&self) -> &dyn JsonCodec {
        self.json.as_ref()
    }

    pub fn display(&self) -> Option<&dyn DisplayEncoder> {
        self.display.as_deref()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// A fresh builder whose `build()` enforces this set's size limit, so
    /// whatever it builds this set can also decode.
    pub fn new_builder(&self) -> TxBuilder {
        TxBuilder::new().with_max_tx_bytes(self.config.max_tx_bytes)
    }
}

impl Default for CodecSet {
    fn default() -> Self {
        Self::standard(CodecConfig::default())
    }
}

impl fmt::Debug for CodecSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecSet")
            .field("config", &self.config)
            .field("display", &self.display.is_some())
            .finish_non_exhaustive()
    }
}
