//! Address encodings
//!
//! All computation and ordering happens on the binary 20-byte [`Address`].
//! [`Lisk32Address`] is the human readable form and is only produced when an
//! output record is rendered.

use alloy_primitives::{Address, Bytes, hex};
use once_cell::sync::Lazy;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of every human readable address
pub const LISK32_PREFIX: &str = "lsk";

/// Length of a binary address
pub const BINARY_ADDRESS_LENGTH: usize = 20;

/// Length of a legacy (pre-migration) address
pub const LEGACY_ADDRESS_LENGTH: usize = 8;

/// Base32 alphabet of the Lisk32 format
const CHARSET: &[u8; 32] = b"zxvcpmbn3465o978uyrtkqew2adsjhfg";

/// BCH generator of the 30-bit checksum
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Address holding every migrated legacy balance: `sha256("legacyReserve")[..20]`
pub static ADDRESS_LEGACY_RESERVE: Lazy<Address> =
    Lazy::new(|| Address::from_slice(&Sha256::digest(b"legacyReserve")[..20]));

/// Human readable address: `lsk` followed by 32 data and 6 checksum base32 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Lisk32Address(String);

impl Lisk32Address {
    /// Render a binary address
    pub fn from_address(address: &Address) -> Self {
        let data = to_uint5(address.as_slice());
        let checksum = create_checksum(&data);

        let mut encoded = String::with_capacity(LISK32_PREFIX.len() + data.len() + checksum.len());
        encoded.push_str(LISK32_PREFIX);
        encoded.extend(data.iter().chain(&checksum).map(|v| CHARSET[*v as usize] as char));
        Self(encoded)
    }

    /// The encoded string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Address> for Lisk32Address {
    fn from(address: &Address) -> Self {
        Self::from_address(address)
    }
}

impl fmt::Display for Lisk32Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of an unregistered legacy account (8 bytes) or a full binary address.
///
/// Ordered by raw bytes; rendered as plain hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LegacyAddress(Bytes);

impl LegacyAddress {
    /// Wrap raw bytes, accepting only the legacy or the binary address length
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        matches!(bytes.len(), LEGACY_ADDRESS_LENGTH | BINARY_ADDRESS_LENGTH)
            .then(|| Self(Bytes::copy_from_slice(bytes)))
    }

    /// Raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for LegacyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for LegacyAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Regroup bytes into 5-bit words. 20 bytes are exactly 32 words, so no padding.
fn to_uint5(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut accumulator: u32 = 0;
    let mut bits = 0;

    for byte in bytes {
        accumulator = ((accumulator << 8) | u32::from(*byte)) & 0xffff;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(((accumulator >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        result.push(((accumulator << (5 - bits)) & 0x1f) as u8);
    }
    result
}

fn polymod(values: impl IntoIterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for value in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn create_checksum(data: &[u8]) -> [u8; 6] {
    let modulus = polymod(data.iter().copied().chain([0u8; 6])) ^ 1;
    let mut checksum = [0u8; 6];
    for (p, word) in checksum.iter_mut().enumerate() {
        *word = ((modulus >> (5 * (5 - p))) & 0x1f) as u8;
    }
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_words(encoded: &str) -> Vec<u8> {
        encoded[LISK32_PREFIX.len()..]
            .bytes()
            .map(|c| CHARSET.iter().position(|x| *x == c).unwrap() as u8)
            .collect()
    }

    #[test]
    fn test_lisk32_shape() {
        let address = Lisk32Address::from_address(&Address::repeat_byte(0xab));
        let encoded = address.as_str();

        assert!(encoded.starts_with(LISK32_PREFIX));
        assert_eq!(encoded.len(), 41);
        assert!(encoded[3..].bytes().all(|c| CHARSET.contains(&c)));
    }

    #[test]
    fn test_lisk32_checksum_verifies() {
        for byte in [0x00, 0x01, 0x7f, 0xff] {
            let encoded = Lisk32Address::from_address(&Address::repeat_byte(byte));
            assert_eq!(polymod(decode_words(encoded.as_str())), 1);
        }
    }

    #[test]
    fn test_lisk32_words_round_trip_bytes() {
        let address =
            Address::from_slice(&hex::decode("c247a42e09e6aafd818821f75b2f5b0de47c8235").unwrap());
        let words = decode_words(Lisk32Address::from_address(&address).as_str());

        // Regroup the 32 data words back into bytes
        let mut bytes = Vec::new();
        let (mut acc, mut bits) = (0u32, 0);
        for word in &words[..32] {
            acc = (acc << 5) | u32::from(*word);
            bits += 5;
            if bits >= 8 {
                bits -= 8;
                bytes.push((acc >> bits) as u8);
            }
        }
        assert_eq!(bytes, address.as_slice());
    }

    #[test]
    fn test_distinct_addresses_distinct_encodings() {
        let a = Lisk32Address::from_address(&Address::repeat_byte(1));
        let b = Lisk32Address::from_address(&Address::repeat_byte(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_legacy_reserve_address() {
        let expected = Sha256::digest(b"legacyReserve");
        assert_eq!(ADDRESS_LEGACY_RESERVE.as_slice(), &expected[..20]);
    }

    #[test]
    fn test_legacy_address_lengths() {
        assert!(LegacyAddress::from_slice(&[1u8; 8]).is_some());
        assert!(LegacyAddress::from_slice(&[1u8; 20]).is_some());
        assert!(LegacyAddress::from_slice(&[1u8; 7]).is_none());
        assert!(LegacyAddress::from_slice(&[]).is_none());

        let address = LegacyAddress::from_slice(&[0xab; 8]).unwrap();
        assert_eq!(address.to_string(), "abababababababab");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"abababababababab\"");
    }
}
