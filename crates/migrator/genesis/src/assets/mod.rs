//! Module genesis assets
//!
//! Each submodule turns snapshot records into the genesis payload of one
//! module of the new chain.

pub mod legacy;
pub mod pos;
pub mod token;

pub use legacy::{LegacyAccountEntry, LegacyStore};
pub use pos::{GenesisDataEntry, PosStore, StakerEntry, ValidatorEntry};
pub use token::{LockedBalance, SupplySubstoreEntry, TokenStore, UserSubstoreEntry};

use alloy_primitives::{Address, Bytes, U256, hex};
use serde::{Serialize, Serializer};

use crate::types::SharingCoefficient;

/// Sharing coefficient as rendered in genesis assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharingCoefficientEntry {
    /// Token the coefficient applies to
    #[serde(rename = "tokenID", serialize_with = "plain_hex")]
    pub token_id: Bytes,
    /// Q96 encoded coefficient
    #[serde(serialize_with = "plain_hex")]
    pub coefficient: Bytes,
}

impl From<&SharingCoefficient> for SharingCoefficientEntry {
    fn from(value: &SharingCoefficient) -> Self {
        Self { token_id: value.token_id.clone(), coefficient: value.coefficient.clone() }
    }
}

/// Carry coefficients over in source order, or seed a zero coefficient for the
/// native token when the source recorded none.
pub(crate) fn sharing_coefficients(
    source: &[SharingCoefficient],
    token_id: &[u8],
) -> Vec<SharingCoefficientEntry> {
    if source.is_empty() {
        return vec![SharingCoefficientEntry {
            token_id: Bytes::copy_from_slice(token_id),
            coefficient: Bytes::from_static(crate::constants::Q96_ZERO),
        }];
    }
    source.iter().map(Into::into).collect()
}

/// Order rows by binary address, then drop the key
pub(crate) fn sorted_by_address<T>(mut rows: Vec<(Address, T)>) -> Vec<T> {
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Serialize bytes as hex without the `0x` prefix
pub(crate) fn plain_hex<S: Serializer, T: AsRef<[u8]>>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(value))
}

/// Serialize an amount as a decimal string
pub(crate) fn decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
