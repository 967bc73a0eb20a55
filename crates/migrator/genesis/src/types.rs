//! Snapshot input records
//!
//! These are read-only views of the legacy chain state at the snapshot height.
//! Amounts are arbitrary precision ([`U256`]) and deserialize from decimal or
//! `0x`-prefixed strings.

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::LegacyAddress;

/// Generator keys known for registered delegates
pub type ValidatorKeys = BTreeMap<Address, B256>;

/// A legacy chain account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Binary address
    pub address: Address,
    /// Token state
    pub token: TokenState,
    /// Nonce state
    #[serde(default)]
    pub sequence: SequenceState,
    /// Signing keys
    #[serde(default)]
    pub keys: KeysState,
    /// Delegation state
    #[serde(default)]
    pub dpos: DposState,
}

impl Account {
    /// Create an account holding only a balance
    pub fn new(address: Address, balance: U256) -> Self {
        Self {
            address,
            token: TokenState { balance },
            sequence: SequenceState::default(),
            keys: KeysState::default(),
            dpos: DposState::default(),
        }
    }

    /// Attach a delegate registration
    pub fn with_delegate(mut self, delegate: DelegateRecord) -> Self {
        self.dpos.delegate = Some(delegate);
        self
    }

    /// Add a sent vote
    pub fn with_vote(mut self, vote: SentVote) -> Self {
        self.dpos.sent_votes.push(vote);
        self
    }

    /// Add a pending unlock
    pub fn with_unlocking(mut self, unlocking: UnlockingEntry) -> Self {
        self.dpos.unlocking.push(unlocking);
        self
    }

    /// Registered delegate record, if the account registered a name
    pub fn registered_delegate(&self) -> Option<&DelegateRecord> {
        self.dpos.delegate.as_ref().filter(|d| !d.username.is_empty())
    }

    /// Whether the account has outstanding votes or unlocks
    pub fn has_stakes(&self) -> bool {
        !self.dpos.sent_votes.is_empty() || !self.dpos.unlocking.is_empty()
    }
}

/// Token balance of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// Spendable balance
    pub balance: U256,
}

/// Account nonce
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    /// Next transaction nonce
    pub nonce: u64,
}

/// Multisignature key set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysState {
    /// Keys that must sign
    pub mandatory_keys: Vec<Bytes>,
    /// Keys that may sign
    pub optional_keys: Vec<Bytes>,
    /// Required signature count
    pub number_of_signatures: u32,
}

/// Delegation state of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DposState {
    /// Own delegate registration
    #[serde(default)]
    pub delegate: Option<DelegateRecord>,
    /// Outstanding votes, in source order
    #[serde(default)]
    pub sent_votes: Vec<SentVote>,
    /// Unvoted amounts waiting to be unlocked, in source order
    #[serde(default)]
    pub unlocking: Vec<UnlockingEntry>,
}

/// Delegate registration on the legacy chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRecord {
    /// Registered name, empty when not a delegate
    pub username: String,
    /// Height of the last forged block
    #[serde(default)]
    pub last_forged_height: u32,
    /// Whether the delegate is banned
    #[serde(default)]
    pub is_banned: bool,
    /// Heights of proof-of-misbehavior punishments
    #[serde(default)]
    pub pom_heights: Vec<u32>,
    /// Missed blocks in a row
    #[serde(default)]
    pub consecutive_missed_blocks: u32,
    /// Total votes received
    #[serde(default)]
    pub total_votes_received: U256,
    /// Reward sharing coefficients, in source order
    #[serde(default)]
    pub sharing_coefficients: Vec<SharingCoefficient>,
}

impl DelegateRecord {
    /// Create a record for a registered name
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), ..Default::default() }
    }
}

/// A vote sent to a delegate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentVote {
    /// Voted delegate
    pub delegate_address: Address,
    /// Locked amount
    pub amount: U256,
    /// Reward sharing snapshot, in chronological append order
    #[serde(default)]
    pub sharing_coefficients: Vec<SharingCoefficient>,
}

impl SentVote {
    /// Create a vote without a sharing snapshot
    pub fn new(delegate_address: Address, amount: U256) -> Self {
        Self { delegate_address, amount, sharing_coefficients: Vec::new() }
    }
}

/// An unvote waiting for its unlock height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockingEntry {
    /// Unvoted delegate
    pub delegate_address: Address,
    /// Locked amount
    pub amount: U256,
    /// Height the unvote happened at
    pub unvote_height: u32,
}

/// Per-token reward sharing coefficient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingCoefficient {
    /// Token the coefficient applies to
    #[serde(rename = "tokenID")]
    pub token_id: Bytes,
    /// Q96 encoded coefficient
    pub coefficient: Bytes,
}

/// Unregistered legacy account decoded from the legacy blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyStoreEntry {
    /// Legacy address
    pub address: LegacyAddress,
    /// Balance held by the address
    pub balance: U256,
}

/// Vote weights recorded per round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteWeights {
    /// One entry per recorded round
    pub vote_weights: Vec<RoundVoteWeights>,
}

impl VoteWeights {
    /// Vote weights of a round
    pub fn round(&self, round: u32) -> Option<&RoundVoteWeights> {
        self.vote_weights.iter().find(|w| w.round == round)
    }
}

/// Delegates and their weights for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundVoteWeights {
    /// Round number
    pub round: u32,
    /// Delegates of the round
    pub delegates: Vec<DelegateWeight>,
}

/// Weight of a single delegate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateWeight {
    /// Delegate address
    pub address: Address,
    /// Accumulated vote weight
    pub vote_weight: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_json() {
        let json = r#"{
            "address": "0xabd2ed5ad35b3a0870aadae6dceacc988ba63895",
            "token": { "balance": "1000" },
            "dpos": {
                "delegate": { "username": "genesis_1", "lastForgedHeight": 5 },
                "sentVotes": [
                    { "delegateAddress": "0x03f6d90b7dbd0497dc3a52d1c27e23bb8c75897f", "amount": "0x64" }
                ],
                "unlocking": []
            }
        }"#;

        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.token.balance, U256::from(1000));
        assert_eq!(account.dpos.sent_votes[0].amount, U256::from(100));
        assert_eq!(account.registered_delegate().unwrap().last_forged_height, 5);
        assert!(account.has_stakes());
        assert_eq!(account.sequence.nonce, 0);
    }

    #[test]
    fn test_empty_username_is_not_registered() {
        let account = Account::new(Address::repeat_byte(1), U256::ZERO)
            .with_delegate(DelegateRecord::new(""));

        assert!(account.registered_delegate().is_none());
        assert!(!account.has_stakes());
    }

    #[test]
    fn test_vote_weights_round_lookup() {
        let weights = VoteWeights {
            vote_weights: vec![RoundVoteWeights { round: 7, delegates: Vec::new() }],
        };

        assert!(weights.round(7).is_some());
        assert!(weights.round(8).is_none());
    }
}
