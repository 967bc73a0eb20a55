//! Proof-of-stake module assets: validators, stakers and the initial validator set

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::Serialize;
use tracing::info;

use super::{SharingCoefficientEntry, decimal, plain_hex, sharing_coefficients, sorted_by_address};
use crate::{
    GenesisError, SnapshotConfig,
    address::Lisk32Address,
    constants::{
        DUMMY_PROOF_OF_POSSESSION, INVALID_BLS_KEY, INVALID_ED25519_KEY, MAX_COMMISSION,
        NUMBER_ACTIVE_VALIDATORS, POS_INIT_ROUNDS, VOTE_WEIGHT_ROUND_OFFSET,
    },
    types::{Account, DelegateWeight, ValidatorKeys, VoteWeights},
};

/// Validator record of the PoS module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorEntry {
    /// Validator address
    pub address: Lisk32Address,
    /// Registered name
    pub name: String,
    /// BLS key
    #[serde(serialize_with = "plain_hex")]
    pub bls_key: Bytes,
    /// Proof of possession of the BLS key
    #[serde(serialize_with = "plain_hex")]
    pub proof_of_possession: Bytes,
    /// Block generator key
    #[serde(serialize_with = "plain_hex")]
    pub generator_key: B256,
    /// Last height the validator generated a block at
    pub last_generated_height: u32,
    /// Whether the validator is banned
    pub is_banned: bool,
    /// Heights misbehavior was reported at
    pub report_misbehavior_heights: Vec<u32>,
    /// Missed blocks in a row
    pub consecutive_missed_blocks: u32,
    /// Height of the last commission increase
    pub last_commission_increase_height: u32,
    /// Commission in hundredths of a percent
    pub commission: u32,
    /// Reward sharing coefficients
    pub sharing_coefficients: Vec<SharingCoefficientEntry>,
}

/// Stake of a staker on one validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeEntry {
    /// Staked validator
    pub validator_address: Lisk32Address,
    /// Staked amount
    #[serde(serialize_with = "decimal")]
    pub amount: U256,
    /// Sharing coefficients snapshot, in source order
    pub sharing_coefficients: Vec<SharingCoefficientEntry>,
}

/// Unstaked amount waiting to be unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUnlockEntry {
    /// Unstaked validator
    pub validator_address: Lisk32Address,
    /// Amount
    #[serde(serialize_with = "decimal")]
    pub amount: U256,
    /// Height of the unstake
    pub unstake_height: u32,
}

/// Staker record of the PoS module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakerEntry {
    /// Staker address
    pub address: Lisk32Address,
    /// Stakes, in source order
    pub stakes: Vec<StakeEntry>,
    /// Pending unlocks, in source order
    pub pending_unlocks: Vec<PendingUnlockEntry>,
}

/// Bootstrap data of the PoS module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisDataEntry {
    /// Rounds run with the initial validators
    pub init_rounds: u32,
    /// Initial validators, by vote weight
    pub init_validators: Vec<Lisk32Address>,
}

/// Genesis payload of the PoS module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosStore {
    /// Validators, sorted by binary address
    pub validators: Vec<ValidatorEntry>,
    /// Stakers, sorted by binary address
    pub stakers: Vec<StakerEntry>,
    /// Bootstrap data
    pub genesis_data: GenesisDataEntry,
}

/// Validator entry for an account with a delegate registration
pub fn validator_entry(
    account: &Account,
    validator_keys: &ValidatorKeys,
    config: &SnapshotConfig,
) -> Option<ValidatorEntry> {
    let delegate = account.registered_delegate()?;

    Some(ValidatorEntry {
        address: Lisk32Address::from_address(&account.address),
        name: delegate.username.clone(),
        bls_key: Bytes::copy_from_slice(&INVALID_BLS_KEY),
        proof_of_possession: Bytes::copy_from_slice(&DUMMY_PROOF_OF_POSSESSION),
        generator_key: validator_keys
            .get(&account.address)
            .copied()
            .unwrap_or(B256::new(INVALID_ED25519_KEY)),
        last_generated_height: delegate.last_forged_height.min(config.snapshot_height),
        is_banned: delegate.is_banned,
        report_misbehavior_heights: delegate.pom_heights.clone(),
        consecutive_missed_blocks: delegate.consecutive_missed_blocks,
        last_commission_increase_height: config.snapshot_height,
        commission: MAX_COMMISSION,
        sharing_coefficients: sharing_coefficients(
            &delegate.sharing_coefficients,
            config.token_id.as_slice(),
        ),
    })
}

/// Stakes of an account, one per sent vote
pub fn stakes(account: &Account, config: &SnapshotConfig) -> Vec<StakeEntry> {
    account
        .dpos
        .sent_votes
        .iter()
        .map(|vote| StakeEntry {
            validator_address: Lisk32Address::from_address(&vote.delegate_address),
            amount: vote.amount,
            sharing_coefficients: sharing_coefficients(
                &vote.sharing_coefficients,
                config.token_id.as_slice(),
            ),
        })
        .collect()
}

/// Staker entry for an account with votes or pending unlocks
pub fn staker_entry(account: &Account, config: &SnapshotConfig) -> Option<StakerEntry> {
    if !account.has_stakes() {
        return None;
    }

    let pending_unlocks = account
        .dpos
        .unlocking
        .iter()
        .map(|unlock| PendingUnlockEntry {
            validator_address: Lisk32Address::from_address(&unlock.delegate_address),
            amount: unlock.amount,
            unstake_height: unlock.unvote_height,
        })
        .collect();

    Some(StakerEntry {
        address: Lisk32Address::from_address(&account.address),
        stakes: stakes(account, config),
        pending_unlocks,
    })
}

/// All validators, sorted by binary address
pub fn validators(
    accounts: &[Account],
    validator_keys: &ValidatorKeys,
    config: &SnapshotConfig,
) -> Vec<ValidatorEntry> {
    sorted_by_address(
        accounts
            .iter()
            .filter_map(|a| validator_entry(a, validator_keys, config).map(|v| (a.address, v)))
            .collect(),
    )
}

/// All stakers, sorted by binary address
pub fn stakers(accounts: &[Account], config: &SnapshotConfig) -> Vec<StakerEntry> {
    sorted_by_address(
        accounts
            .iter()
            .filter_map(|a| staker_entry(a, config).map(|s| (a.address, s)))
            .collect(),
    )
}

/// Order delegates by vote weight, highest first; equal weights by address
pub fn rank_delegates(delegates: &mut [DelegateWeight]) {
    delegates.sort_by(|a, b| {
        b.vote_weight.cmp(&a.vote_weight).then_with(|| a.address.cmp(&b.address))
    });
}

/// Initial validators: the top delegates of the round whose vote weights
/// govern the snapshot round.
pub fn init_validators(
    vote_weights: &VoteWeights,
    config: &SnapshotConfig,
) -> Result<Vec<Address>, GenesisError> {
    let round = config.snapshot_round()?.saturating_sub(VOTE_WEIGHT_ROUND_OFFSET);
    let round_weights = vote_weights
        .round(round)
        .filter(|weights| !weights.delegates.is_empty())
        .ok_or(GenesisError::MissingRoundData { round })?;

    let mut delegates = round_weights.delegates.clone();
    rank_delegates(&mut delegates);

    Ok(delegates.into_iter().take(NUMBER_ACTIVE_VALIDATORS).map(|d| d.address).collect())
}

/// Bootstrap data of the PoS module
pub fn genesis_data(
    vote_weights: &VoteWeights,
    config: &SnapshotConfig,
) -> Result<GenesisDataEntry, GenesisError> {
    let init_validators = init_validators(vote_weights, config)?;

    Ok(GenesisDataEntry {
        init_rounds: POS_INIT_ROUNDS,
        init_validators: init_validators.iter().map(Lisk32Address::from_address).collect(),
    })
}

/// Build the PoS module payload
pub fn pos_module_asset(
    accounts: &[Account],
    vote_weights: &VoteWeights,
    validator_keys: &ValidatorKeys,
    config: &SnapshotConfig,
) -> Result<PosStore, GenesisError> {
    let genesis_data = genesis_data(vote_weights, config)?;
    let validators = validators(accounts, validator_keys, config);
    let stakers = stakers(accounts, config);

    info!(
        target: "migrator::genesis",
        validators = validators.len(),
        stakers = stakers.len(),
        init_validators = genesis_data.init_validators.len(),
        "Built PoS module asset"
    );

    Ok(PosStore { validators, stakers, genesis_data })
}
