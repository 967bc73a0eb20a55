//! Snapshot configuration types

use alloy_primitives::{B64, hex};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{GenesisError, constants::ROUND_LENGTH};

/// Network identifier of the legacy mainnet
pub const MAINNET_NETWORK_ID: &str =
    "4c09e6a781fc4c7bdb936ee815de8f94190f8a7519becd9de2081832be309a99";

/// Network identifier of the legacy testnet
pub const TESTNET_NETWORK_ID: &str =
    "15f0dacc1060e91818224a94286b13aa04279c640bd5d6f193182031d133df7c";

/// Legacy network the snapshot is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production mainnet
    Mainnet,
    /// Public testnet
    Testnet,
    /// Local development
    #[default]
    Devnet,
}

impl NetworkType {
    /// Resolve a network from the identifier reported by the legacy node
    pub fn from_network_identifier(identifier: &str) -> Result<Self, GenesisError> {
        match identifier.trim_start_matches("0x").to_ascii_lowercase().as_str() {
            MAINNET_NETWORK_ID => Ok(Self::Mainnet),
            TESTNET_NETWORK_ID => Ok(Self::Testnet),
            _ => Err(GenesisError::UnknownNetwork(identifier.to_string())),
        }
    }

    /// Token ID of the native token
    pub const fn token_id(&self) -> B64 {
        match self {
            Self::Mainnet => B64::new([0, 0, 0, 0, 0, 0, 0, 0]),
            Self::Testnet => B64::new([1, 0, 0, 0, 0, 0, 0, 0]),
            Self::Devnet => B64::new([4, 0, 0, 0, 0, 0, 0, 0]),
        }
    }

    /// Height of the snapshot block the legacy network itself started from
    pub const fn prev_snapshot_height(&self) -> u32 {
        match self {
            Self::Mainnet => 16_270_293,
            Self::Testnet => 14_075_260,
            Self::Devnet => 0,
        }
    }

    /// Network name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl FromStr for NetworkType {
    type Err = GenesisError;

    /// Accepts a network name or a legacy network identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            _ => Self::from_network_identifier(s),
        }
    }
}

/// Immutable configuration of one genesis build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    /// Network type
    pub network: NetworkType,
    /// Native token ID
    #[serde(rename = "tokenID")]
    pub token_id: B64,
    /// Height the snapshot is taken at
    pub snapshot_height: u32,
    /// Height the legacy network started from
    pub prev_snapshot_height: u32,
}

impl SnapshotConfig {
    /// Create a config with the network defaults
    pub const fn new(network: NetworkType, snapshot_height: u32) -> Self {
        Self {
            network,
            token_id: network.token_id(),
            snapshot_height,
            prev_snapshot_height: network.prev_snapshot_height(),
        }
    }

    /// Create a devnet config
    pub const fn devnet(snapshot_height: u32) -> Self {
        Self::new(NetworkType::Devnet, snapshot_height)
    }

    /// Override the token ID
    pub const fn with_token_id(mut self, token_id: B64) -> Self {
        self.token_id = token_id;
        self
    }

    /// Token ID as plain hex
    pub fn token_id_hex(&self) -> String {
        hex::encode(self.token_id)
    }

    /// Round the snapshot height falls into, counted from the previous snapshot
    pub fn snapshot_round(&self) -> Result<u32, GenesisError> {
        let blocks = self.snapshot_height.checked_sub(self.prev_snapshot_height).filter(|b| *b > 0);
        blocks.map(|b| b.div_ceil(ROUND_LENGTH)).ok_or_else(|| {
            GenesisError::InvalidConfig(format!(
                "snapshot height {} is not above previous snapshot height {}",
                self.snapshot_height, self.prev_snapshot_height
            ))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GenesisError> {
        self.snapshot_round().map(|_| ())
    }
}
