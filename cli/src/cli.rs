//! # CLI Interface
//!
//! Defines the command-line argument structure for `txwire` using `clap`
//! derive. Supports four subcommands: `encode`, `decode`, `hash`, and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use txwire_protocol::config::MAX_TX_SIZE_BYTES;

/// Transaction encoder and decoder.
///
/// Converts transactions between their JSON form and the base64-wrapped
/// canonical binary form.
#[derive(Parser, Debug)]
#[command(
    name = "txwire",
    about = "Encode and decode txwire transactions",
    version,
    propagate_version = true
)]
pub struct TxwireCli {
    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "TXWIRE_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format: `pretty` or `json`. Logs always go to stderr.
    #[arg(long, global = true, env = "TXWIRE_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Largest transaction accepted, in bytes, for both JSON input and
    /// decoded binary.
    #[arg(long, global = true, env = "TXWIRE_MAX_TX_BYTES", default_value_t = MAX_TX_SIZE_BYTES)]
    pub max_tx_bytes: usize,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `txwire` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a JSON transaction file and print it as base64.
    Encode(EncodeArgs),
    /// Decode a base64 transaction and print it as JSON.
    Decode(DecodeArgs),
    /// Print the hash of an encoded transaction.
    Hash(HashArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `encode` subcommand.
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Path to a file containing a JSON-encoded transaction. Use `-` for
    /// stdin.
    pub file: PathBuf,
}

/// Arguments for the `decode` subcommand.
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// The encoded transaction.
    pub encoded: String,

    /// Treat the argument as hex instead of base64.
    #[arg(long = "hex", short = 'x')]
    pub hex: bool,

    /// Print the legacy display rendering instead of JSON.
    #[arg(long, conflicts_with = "pretty")]
    pub display: bool,

    /// Indent the JSON output. The default is canonical single-line JSON.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// The encoded transaction.
    pub encoded: String,

    /// Treat the argument as hex instead of base64.
    #[arg(long = "hex", short = 'x')]
    pub hex: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        TxwireCli::command().debug_assert();
    }

    #[test]
    fn parses_decode_flags() {
        let cli = TxwireCli::parse_from(["txwire", "decode", "--hex", "--pretty", "abcd"]);
        match cli.command {
            Commands::Decode(args) => {
                assert!(args.hex);
                assert!(args.pretty);
                assert!(!args.display);
                assert_eq!(args.encoded, "abcd");
            }
            other => panic!("expected decode, got {:?}", other),
        }
    }

    #[test]
    fn display_conflicts_with_pretty() {
        let result =
            TxwireCli::try_parse_from(["txwire", "decode", "--display", "--pretty", "abcd"]);
        assert!(result.is_err());
    }

    #[test]
    fn decode_flags_default_off() {
        let cli = TxwireCli::parse_from(["txwire", "decode", "abcd"]);
        match cli.command {
            Commands::Decode(args) => {
                assert!(!args.hex && !args.pretty && !args.display);
            }
            other => panic!("expected decode, got {:?}", other),
        }
    }

    #[test]
    fn global_limit_after_subcommand() {
        let cli = TxwireCli::parse_from(["txwire", "encode", "tx.json", "--max-tx-bytes", "4096"]);
        assert_eq!(cli.max_tx_bytes, 4096);
    }
}
