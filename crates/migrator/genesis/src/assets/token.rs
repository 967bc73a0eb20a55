//! Token module assets: user balances and total supply

use alloy_primitives::{Address, B64, U256};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{decimal, plain_hex};
use crate::{
    GenesisError, SnapshotConfig,
    address::{ADDRESS_LEGACY_RESERVE, Lisk32Address},
    checked_sum,
    constants::{MODULE_NAME_LEGACY, MODULE_NAME_POS},
    types::{Account, LegacyStoreEntry},
};

/// Funds of an account locked by a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedBalance {
    /// Owning module
    pub module: &'static str,
    /// Locked amount
    #[serde(serialize_with = "decimal")]
    pub amount: U256,
}

/// Balance row keyed by binary address, before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBalance {
    /// Binary address
    pub address: Address,
    /// Token ID
    pub token_id: B64,
    /// Spendable balance
    pub available_balance: U256,
    /// Locked balances
    pub locked_balances: Vec<LockedBalance>,
}

impl UserBalance {
    /// Sum of all locked balances
    pub fn total_locked(&self) -> Result<U256, GenesisError> {
        self.locked_balances
            .iter()
            .try_fold(U256::ZERO, |acc, lock| checked_sum(acc, lock.amount, "locked balances"))
    }
}

/// Row of the token user substore
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubstoreEntry {
    /// Account address
    pub address: Lisk32Address,
    /// Token ID
    #[serde(rename = "tokenID", serialize_with = "plain_hex")]
    pub token_id: B64,
    /// Spendable balance
    #[serde(serialize_with = "decimal")]
    pub available_balance: U256,
    /// Locked balances
    pub locked_balances: Vec<LockedBalance>,
}

impl From<UserBalance> for UserSubstoreEntry {
    fn from(row: UserBalance) -> Self {
        Self {
            address: Lisk32Address::from_address(&row.address),
            token_id: row.token_id,
            available_balance: row.available_balance,
            locked_balances: row.locked_balances,
        }
    }
}

/// Row of the token supply substore
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplySubstoreEntry {
    /// Token ID
    #[serde(rename = "tokenID", serialize_with = "plain_hex")]
    pub token_id: B64,
    /// Total supply of the token
    #[serde(serialize_with = "decimal")]
    pub total_supply: U256,
}

/// Row of the token escrow substore
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowSubstoreEntry {
    /// Chain the tokens are escrowed for
    #[serde(rename = "escrowChainID", serialize_with = "plain_hex")]
    pub escrow_chain_id: B64,
    /// Token ID
    #[serde(rename = "tokenID", serialize_with = "plain_hex")]
    pub token_id: B64,
    /// Escrowed amount
    #[serde(serialize_with = "decimal")]
    pub amount: U256,
}

/// Row of the supported tokens substore
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedTokensEntry {
    /// Chain ID
    #[serde(rename = "chainID", serialize_with = "plain_hex")]
    pub chain_id: B64,
    /// Supported token IDs
    #[serde(rename = "supportedTokenIDs")]
    pub supported_token_ids: Vec<String>,
}

/// Genesis payload of the token module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStore {
    /// User balances, sorted by binary address then token ID
    pub user_substore: Vec<UserSubstoreEntry>,
    /// Supply per token
    pub supply_substore: Vec<SupplySubstoreEntry>,
    /// Always empty at migration
    pub escrow_substore: Vec<EscrowSubstoreEntry>,
    /// Always empty at migration
    pub supported_tokens_substore: Vec<SupportedTokensEntry>,
}

/// Locked balances of an account.
///
/// Votes and pending unlocks are summed into a single `pos` lock. Accounts
/// without locks, and missing accounts, have no entry at all.
pub fn locked_balances(account: Option<&Account>) -> Result<Vec<LockedBalance>, GenesisError> {
    let Some(account) = account else { return Ok(Vec::new()) };

    let votes = account.dpos.sent_votes.iter().map(|vote| vote.amount);
    let unlocking = account.dpos.unlocking.iter().map(|unlock| unlock.amount);
    let amount = votes
        .chain(unlocking)
        .try_fold(U256::ZERO, |acc, amount| checked_sum(acc, amount, "vote locks"))?;

    if amount.is_zero() {
        return Ok(Vec::new());
    }
    Ok(vec![LockedBalance { module: MODULE_NAME_POS, amount }])
}

/// Consolidate the legacy reserve account and every unregistered legacy
/// account into one row at [`ADDRESS_LEGACY_RESERVE`].
///
/// The available balance stays the reserve account's own balance; the reserve
/// balance plus all legacy balances are recorded as a `legacy` lock, appended
/// after the reserve account's own locks.
pub fn legacy_reserve_entry(
    accounts: &[Account],
    legacy_accounts: &[LegacyStoreEntry],
    token_id: B64,
) -> Result<UserBalance, GenesisError> {
    let reserve = accounts.iter().find(|account| account.address == *ADDRESS_LEGACY_RESERVE);
    let available_balance = reserve.map(|account| account.token.balance).unwrap_or_default();

    let reserve_amount = legacy_accounts.iter().try_fold(available_balance, |acc, entry| {
        checked_sum(acc, entry.balance, "legacy reserve")
    })?;

    let mut locked = locked_balances(reserve)?;
    locked.push(LockedBalance { module: MODULE_NAME_LEGACY, amount: reserve_amount });

    debug!(
        target: "migrator::genesis",
        reserve_exists = reserve.is_some(),
        legacy_accounts = legacy_accounts.len(),
        %reserve_amount,
        "Consolidated legacy reserve"
    );

    Ok(UserBalance {
        address: *ADDRESS_LEGACY_RESERVE,
        token_id,
        available_balance,
        locked_balances: locked,
    })
}

/// Build the user substore.
///
/// Rows are sorted on the binary address and token ID and only then rendered,
/// so the order never depends on the human readable encoding.
pub fn user_substore(
    accounts: &[Account],
    legacy_accounts: &[LegacyStoreEntry],
    token_id: B64,
) -> Result<Vec<UserSubstoreEntry>, GenesisError> {
    let mut seen = BTreeSet::new();
    let mut rows = Vec::with_capacity(accounts.len() + 1);

    for account in accounts {
        if !seen.insert(account.address) {
            return Err(GenesisError::DuplicateAccount(account.address));
        }
        if account.address == *ADDRESS_LEGACY_RESERVE {
            continue;
        }
        rows.push(UserBalance {
            address: account.address,
            token_id,
            available_balance: account.token.balance,
            locked_balances: locked_balances(Some(account))?,
        });
    }
    rows.push(legacy_reserve_entry(accounts, legacy_accounts, token_id)?);

    rows.sort_by_key(|row| (row.address, row.token_id));
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Build the supply substore: every account's balance plus its locked amounts.
pub fn supply_substore(
    accounts: &[Account],
    token_id: B64,
) -> Result<Vec<SupplySubstoreEntry>, GenesisError> {
    let mut total_supply = U256::ZERO;
    for account in accounts {
        total_supply = checked_sum(total_supply, account.token.balance, "total supply")?;
        for lock in locked_balances(Some(account))? {
            total_supply = checked_sum(total_supply, lock.amount, "total supply")?;
        }
    }
    Ok(vec![SupplySubstoreEntry { token_id, total_supply }])
}

/// Build the token module payload
pub fn token_module_asset(
    accounts: &[Account],
    legacy_accounts: &[LegacyStoreEntry],
    config: &SnapshotConfig,
) -> Result<TokenStore, GenesisError> {
    let user_substore = user_substore(accounts, legacy_accounts, config.token_id)?;
    let supply_substore = supply_substore(accounts, config.token_id)?;

    info!(
        target: "migrator::genesis",
        users = user_substore.len(),
        total_supply = %supply_substore[0].total_supply,
        "Built token module asset"
    );

    Ok(TokenStore {
        user_substore,
        supply_substore,
        escrow_substore: Vec::new(),
        supported_tokens_substore: Vec::new(),
    })
}
