//! Genesis assets builder

use alloy_primitives::hex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::{
    GenesisError, SnapshotConfig,
    assets::{
        LegacyStore, PosStore, TokenStore,
        legacy::{legacy_accounts, legacy_module_asset},
        pos::pos_module_asset,
        token::token_module_asset,
    },
    codec::decode_vote_weights,
    constants::{MODULE_NAME_LEGACY, MODULE_NAME_POS, MODULE_NAME_TOKEN},
    source::SnapshotSource,
};

/// Genesis payload of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "module", content = "data", rename_all = "lowercase")]
pub enum ModuleAsset {
    /// Legacy module
    Legacy(LegacyStore),
    /// Proof-of-stake module
    Pos(PosStore),
    /// Token module
    Token(TokenStore),
}

impl ModuleAsset {
    /// Module name
    pub const fn module(&self) -> &'static str {
        match self {
            Self::Legacy(_) => MODULE_NAME_LEGACY,
            Self::Pos(_) => MODULE_NAME_POS,
            Self::Token(_) => MODULE_NAME_TOKEN,
        }
    }
}

/// Assets document merged into the genesis block of the new chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenesisAssets {
    /// Module assets, sorted by module name
    pub assets: Vec<ModuleAsset>,
}

impl GenesisAssets {
    /// Create a document, ordering assets by module name
    pub fn new(mut assets: Vec<ModuleAsset>) -> Self {
        assets.sort_by_key(ModuleAsset::module);
        Self { assets }
    }

    /// Asset of a module
    pub fn module(&self, name: &str) -> Option<&ModuleAsset> {
        self.assets.iter().find(|asset| asset.module() == name)
    }

    /// Hex SHA-256 of the compact JSON encoding.
    ///
    /// Operators compare this value to agree on the generated assets.
    pub fn digest(&self) -> Result<String, GenesisError> {
        let encoded = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&encoded)))
    }

    /// Get assets as JSON string
    pub fn to_json(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write assets to a JSON file
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GenesisError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for the genesis assets of a snapshot
#[derive(Debug)]
pub struct GenesisAssetsBuilder {
    config: SnapshotConfig,
}

impl GenesisAssetsBuilder {
    /// Create a new builder
    pub const fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Build configuration
    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Build every module asset from a snapshot.
    ///
    /// All inputs are decoded before any asset is built; the first invalid
    /// input aborts the build.
    pub fn build(&self, source: &impl SnapshotSource) -> Result<GenesisAssets, GenesisError> {
        self.config.validate()?;

        let accounts = source.accounts()?;
        let legacy_accounts = legacy_accounts(&source.legacy_blob()?)?;
        let vote_weights = decode_vote_weights(&source.vote_weights_blob()?)?;
        let validator_keys = source.validator_keys()?;

        info!(
            target: "migrator::genesis",
            network = self.config.network.name(),
            snapshot_height = self.config.snapshot_height,
            token_id = %self.config.token_id_hex(),
            accounts = accounts.len(),
            "Building genesis assets"
        );

        let token = token_module_asset(&accounts, &legacy_accounts, &self.config)?;
        let pos = pos_module_asset(&accounts, &vote_weights, &validator_keys, &self.config)?;
        let legacy = legacy_module_asset(&legacy_accounts);

        Ok(GenesisAssets::new(vec![
            ModuleAsset::Token(token),
            ModuleAsset::Pos(pos),
            ModuleAsset::Legacy(legacy),
        ]))
    }

    /// Build and write assets to a JSON file, returning the digest
    pub fn write_json(
        &self,
        source: &impl SnapshotSource,
        path: impl AsRef<Path>,
    ) -> Result<String, GenesisError> {
        let assets = self.build(source)?;
        assets.write_json(path)?;
        assets.digest()
    }
}
