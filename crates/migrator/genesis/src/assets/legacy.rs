//! Legacy module assets: unregistered accounts awaiting reclaim

use alloy_primitives::U256;
use serde::Serialize;
use tracing::info;

use super::decimal;
use crate::{
    GenesisError, LegacyAddress, checked_sum, codec::decode_legacy_accounts,
    types::LegacyStoreEntry,
};

/// Account of the legacy module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyAccountEntry {
    /// Legacy address, plain hex
    pub address: LegacyAddress,
    /// Reclaimable balance
    #[serde(serialize_with = "decimal")]
    pub balance: U256,
}

/// Genesis payload of the legacy module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyStore {
    /// Accounts, sorted by address bytes
    pub accounts: Vec<LegacyAccountEntry>,
}

/// Extract the unregistered legacy accounts from the raw chain state blob
pub fn legacy_accounts(blob: &[u8]) -> Result<Vec<LegacyStoreEntry>, GenesisError> {
    let entries = decode_legacy_accounts(blob)?;
    let total = entries
        .iter()
        .try_fold(U256::ZERO, |acc, e| checked_sum(acc, e.balance, "legacy accounts"))?;

    info!(
        target: "migrator::genesis",
        accounts = entries.len(),
        %total,
        "Extracted legacy accounts"
    );
    Ok(entries)
}

/// Build the legacy module payload
pub fn legacy_module_asset(entries: &[LegacyStoreEntry]) -> LegacyStore {
    let mut accounts: Vec<_> = entries
        .iter()
        .map(|e| LegacyAccountEntry { address: e.address.clone(), balance: e.balance })
        .collect();
    accounts.sort_by(|a, b| a.address.cmp(&b.address));

    LegacyStore { accounts }
}
