//! Binary schemas of the legacy chain state
//!
//! The legacy node stores chain state entries with a protobuf-compatible
//! codec. Only the two entries the migration needs are modelled here:
//! the unregistered legacy addresses and the per-round delegate vote weights.

use alloy_primitives::{Address, U256};
use prost::Message;
use std::collections::BTreeSet;
use tracing::debug;

use crate::{
    GenesisError,
    address::{BINARY_ADDRESS_LENGTH, LegacyAddress},
    types::{DelegateWeight, LegacyStoreEntry, RoundVoteWeights, VoteWeights},
};

/// Schema name of the unregistered addresses entry
pub const UNREGISTERED_ADDRESSES_SCHEMA: &str = "unregisteredAddresses";

/// Schema name of the delegate vote weights entry
pub const DELEGATE_VOTE_WEIGHTS_SCHEMA: &str = "dpos:delegateVoteWeights";

/// `unregisteredAddresses` chain state entry
#[derive(Clone, PartialEq, Message)]
pub struct UnregisteredAddresses {
    /// Unregistered accounts
    #[prost(message, repeated, tag = "1")]
    pub unregistered_addresses: Vec<UnregisteredAddress>,
}

/// One unregistered account
#[derive(Clone, PartialEq, Message)]
pub struct UnregisteredAddress {
    /// 8-byte legacy address
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    /// Balance in beddows
    #[prost(uint64, tag = "2")]
    pub balance: u64,
}

/// `dpos:delegateVoteWeights` chain state entry
#[derive(Clone, PartialEq, Message)]
pub struct DelegateVoteWeights {
    /// Recorded rounds
    #[prost(message, repeated, tag = "1")]
    pub vote_weights: Vec<RoundWeights>,
}

/// Vote weights of one round
#[derive(Clone, PartialEq, Message)]
pub struct RoundWeights {
    /// Round number
    #[prost(uint32, tag = "1")]
    pub round: u32,
    /// Delegates of the round
    #[prost(message, repeated, tag = "2")]
    pub delegates: Vec<DelegateWeightRecord>,
}

/// Weight of one delegate
#[derive(Clone, PartialEq, Message)]
pub struct DelegateWeightRecord {
    /// 20-byte delegate address
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    /// Vote weight
    #[prost(uint64, tag = "2")]
    pub vote_weight: u64,
}

/// Decode the unregistered addresses blob.
///
/// Fails on malformed wire data, on addresses of unexpected length and on
/// duplicate addresses. Entries keep the order of the blob.
pub fn decode_legacy_accounts(blob: &[u8]) -> Result<Vec<LegacyStoreEntry>, GenesisError> {
    let decoded = UnregisteredAddresses::decode(blob).map_err(|source| GenesisError::Decode {
        schema: UNREGISTERED_ADDRESSES_SCHEMA,
        source,
    })?;

    let mut seen = BTreeSet::new();
    let mut entries = Vec::with_capacity(decoded.unregistered_addresses.len());
    for record in decoded.unregistered_addresses {
        let address = LegacyAddress::from_slice(&record.address).ok_or(
            GenesisError::InvalidAddressLength {
                schema: UNREGISTERED_ADDRESSES_SCHEMA,
                length: record.address.len(),
            },
        )?;
        if !seen.insert(address.clone()) {
            return Err(GenesisError::DuplicateLegacyAddress(address));
        }
        entries.push(LegacyStoreEntry { address, balance: U256::from(record.balance) });
    }

    debug!(target: "migrator::genesis", accounts = entries.len(), "Decoded legacy accounts");
    Ok(entries)
}

/// Decode the delegate vote weights blob
pub fn decode_vote_weights(blob: &[u8]) -> Result<VoteWeights, GenesisError> {
    let decoded = DelegateVoteWeights::decode(blob).map_err(|source| GenesisError::Decode {
        schema: DELEGATE_VOTE_WEIGHTS_SCHEMA,
        source,
    })?;

    let vote_weights = decoded
        .vote_weights
        .into_iter()
        .map(|round| {
            let delegates = round
                .delegates
                .into_iter()
                .map(|delegate| {
                    if delegate.address.len() != BINARY_ADDRESS_LENGTH {
                        return Err(GenesisError::InvalidAddressLength {
                            schema: DELEGATE_VOTE_WEIGHTS_SCHEMA,
                            length: delegate.address.len(),
                        });
                    }
                    Ok(DelegateWeight {
                        address: Address::from_slice(&delegate.address),
                        vote_weight: U256::from(delegate.vote_weight),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RoundVoteWeights { round: round.round, delegates })
        })
        .collect::<Result<Vec<_>, GenesisError>>()?;

    debug!(target: "migrator::genesis", rounds = vote_weights.len(), "Decoded vote weights");
    Ok(VoteWeights { vote_weights })
}

/// Encode vote weights into the chain state format
pub fn encode_vote_weights(weights: &VoteWeights) -> Vec<u8> {
    DelegateVoteWeights {
        vote_weights: weights
            .vote_weights
            .iter()
            .map(|round| RoundWeights {
                round: round.round,
                delegates: round
                    .delegates
                    .iter()
                    .map(|d| DelegateWeightRecord {
                        address: d.address.to_vec(),
                        vote_weight: d.vote_weight.saturating_to(),
                    })
                    .collect(),
            })
            .collect(),
    }
    .encode_to_vec()
}

/// Encode legacy accounts into the chain state format
pub fn encode_legacy_accounts(entries: &[LegacyStoreEntry]) -> Vec<u8> {
    UnregisteredAddresses {
        unregistered_addresses: entries
            .iter()
            .map(|e| UnregisteredAddress {
                address: e.address.as_slice().to_vec(),
                balance: e.balance.saturating_to(),
            })
            .collect(),
    }
    .encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn legacy(byte: u8, balance: u64) -> LegacyStoreEntry {
        LegacyStoreEntry {
            address: LegacyAddress::from_slice(&[byte; 8]).unwrap(),
            balance: U256::from(balance),
        }
    }

    #[test]
    fn test_decode_legacy_accounts() {
        let entries = vec![legacy(3, 30), legacy(1, 10), legacy(2, 20)];
        let blob = encode_legacy_accounts(&entries);

        let decoded = decode_legacy_accounts(&blob).unwrap();

        // Blob order is kept
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_decode_empty_blob() {
        assert!(decode_legacy_accounts(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_legacy_blob_fails() {
        let result = decode_legacy_accounts(&[0x0a, 0xff, 0xff]);
        assert_matches!(
            result,
            Err(GenesisError::Decode { schema: UNREGISTERED_ADDRESSES_SCHEMA, .. })
        );
    }

    #[test]
    fn test_wrong_schema_fails() {
        // A vote weights blob has a nested round record where the address is expected
        let mut weights = VoteWeights::default();
        weights.vote_weights.push(RoundVoteWeights {
            round: 1,
            delegates: vec![DelegateWeight {
                address: Address::repeat_byte(1),
                vote_weight: U256::from(5),
            }],
        });
        let blob = encode_vote_weights(&weights);

        assert!(decode_legacy_accounts(&blob).is_err());
    }

    #[test]
    fn test_legacy_address_length_checked() {
        let blob = UnregisteredAddresses {
            unregistered_addresses: vec![UnregisteredAddress { address: vec![1; 5], balance: 1 }],
        }
        .encode_to_vec();

        assert_matches!(
            decode_legacy_accounts(&blob),
            Err(GenesisError::InvalidAddressLength { length: 5, .. })
        );
    }

    #[test]
    fn test_duplicate_legacy_address_fails() {
        let blob = encode_legacy_accounts(&[legacy(1, 10), legacy(1, 20)]);
        assert_matches!(
            decode_legacy_accounts(&blob),
            Err(GenesisError::DuplicateLegacyAddress(_))
        );
    }

    #[test]
    fn test_decode_vote_weights() {
        let weights = VoteWeights {
            vote_weights: vec![RoundVoteWeights {
                round: 103,
                delegates: vec![
                    DelegateWeight {
                        address: Address::repeat_byte(0xb8),
                        vote_weight: U256::from(2_130_000_000_000u64),
                    },
                    DelegateWeight {
                        address: Address::repeat_byte(0xf1),
                        vote_weight: U256::from(5_304_000_000_000u64),
                    },
                ],
            }],
        };

        let decoded = decode_vote_weights(&encode_vote_weights(&weights)).unwrap();
        assert_eq!(decoded, weights);
    }

    #[test]
    fn test_vote_weight_address_length_checked() {
        let blob = DelegateVoteWeights {
            vote_weights: vec![RoundWeights {
                round: 1,
                delegates: vec![DelegateWeightRecord { address: vec![1; 8], vote_weight: 1 }],
            }],
        }
        .encode_to_vec();

        assert_matches!(
            decode_vote_weights(&blob),
            Err(GenesisError::InvalidAddressLength { length: 8, .. })
        );
    }

    #[test]
    fn test_malformed_vote_weights_fail() {
        assert_matches!(decode_vote_weights(&[0xff]), Err(GenesisError::Decode { .. }));
    }
}
