//! Migrator Genesis Tool
//!
//! This crate turns a frozen legacy chain snapshot into the module assets that
//! seed the genesis block of the new chain.
//!
//! # Pipeline
//!
//! ```text
//! Snapshot (accounts, legacy blob, vote weights)
//! ├── legacy: decode unregistered accounts ──────────────┐
//! ├── token:  locked balances → reserve → user/supply ◄──┘
//! └── pos:    validators, stakers, init validators (round r - 2)
//!                     │
//!                     ▼
//!           genesis_assets.json (sorted by module)
//! ```
//!
//! Every stage is a pure function of its inputs. Addresses stay binary
//! ([`Address`]) for all sorting and are rendered as
//! [`Lisk32Address`](address::Lisk32Address) only in the output types, so two
//! operators running the tool on the same snapshot get byte-identical output.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod address;
pub mod assets;
pub mod builder;
pub mod codec;
pub mod config;
pub mod source;
pub mod types;

pub use address::{ADDRESS_LEGACY_RESERVE, LegacyAddress, Lisk32Address};
pub use builder::{GenesisAssets, GenesisAssetsBuilder, ModuleAsset};
pub use config::{NetworkType, SnapshotConfig};
pub use source::{SnapshotDir, SnapshotSource};
pub use types::{Account, LegacyStoreEntry, ValidatorKeys, VoteWeights};

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Genesis creation errors
#[derive(Debug, Error)]
pub enum GenesisError {
    /// A binary record did not match its schema
    #[error("Failed to decode {schema}: {source}")]
    Decode {
        /// Name of the schema being decoded
        schema: &'static str,
        /// Underlying wire error
        #[source]
        source: prost::DecodeError,
    },

    /// Address of unexpected length in a decoded record
    #[error("Invalid address length in {schema}: {length} bytes")]
    InvalidAddressLength {
        /// Name of the schema being decoded
        schema: &'static str,
        /// Length found
        length: usize,
    },

    /// Same legacy address listed twice
    #[error("Duplicate legacy address: {0}")]
    DuplicateLegacyAddress(LegacyAddress),

    /// Same account address listed twice
    #[error("Duplicate account address: {0}")]
    DuplicateAccount(Address),

    /// Vote weights for the round are missing or empty
    #[error("Top delegates info for round {round} not found")]
    MissingRoundData {
        /// Round that was looked up
        round: u32,
    },

    /// Balance arithmetic overflowed
    #[error("Balance overflow while summing {context}")]
    BalanceOverflow {
        /// What was being summed
        context: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Network identifier or name not in the network table
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Adds two amounts, failing on overflow.
pub(crate) fn checked_sum(
    acc: U256,
    amount: U256,
    context: &'static str,
) -> Result<U256, GenesisError> {
    acc.checked_add(amount).ok_or(GenesisError::BalanceOverflow { context })
}

/// Legacy network constants
pub mod constants {
    /// Module holding migrated legacy balances
    pub const MODULE_NAME_LEGACY: &str = "legacy";

    /// Token module
    pub const MODULE_NAME_TOKEN: &str = "token";

    /// Proof-of-stake module, owner of vote locks
    pub const MODULE_NAME_POS: &str = "pos";

    /// Rounds the new chain runs with the initial validator set
    pub const POS_INIT_ROUNDS: u32 = 587;

    /// Commission assigned to migrated validators (100.00%)
    pub const MAX_COMMISSION: u32 = 10_000;

    /// Forging slots per round
    pub const NUMBER_ACTIVE_VALIDATORS: usize = 101;

    /// Standby slots per round
    pub const NUMBER_STANDBY_VALIDATORS: usize = 2;

    /// Blocks per round
    pub const ROUND_LENGTH: u32 = (NUMBER_ACTIVE_VALIDATORS + NUMBER_STANDBY_VALIDATORS) as u32;

    /// Vote weights used for round `r` are the ones recorded for round `r - 2`
    pub const VOTE_WEIGHT_ROUND_OFFSET: u32 = 2;

    /// Placeholder BLS key for validators that never registered one
    pub const INVALID_BLS_KEY: [u8; 48] = [0u8; 48];

    /// Placeholder generator key for validators without a known key
    pub const INVALID_ED25519_KEY: [u8; 32] = [0xff; 32];

    /// Placeholder proof of possession
    pub const DUMMY_PROOF_OF_POSSESSION: [u8; 96] = [0u8; 96];

    /// Zero sharing coefficient (Q96 encoding of zero is the empty byte string)
    pub const Q96_ZERO: &[u8] = &[];

    /// File the assembled document is written to
    pub const GENESIS_ASSETS_FILE_NAME: &str = "genesis_assets.json";
}
