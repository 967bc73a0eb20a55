//! Snapshot sources
//!
//! A source hands the builder fully materialized collections. Fetching from a
//! running legacy node and dumping its store happens before the build starts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    GenesisError,
    types::{Account, ValidatorKeys},
};

/// Accounts file inside a snapshot directory
pub const ACCOUNTS_FILE_NAME: &str = "accounts.json";

/// Encoded `unregisteredAddresses` entry inside a snapshot directory
pub const LEGACY_ACCOUNTS_FILE_NAME: &str = "legacy_accounts.blob";

/// Encoded `dpos:delegateVoteWeights` entry inside a snapshot directory
pub const VOTE_WEIGHTS_FILE_NAME: &str = "vote_weights.blob";

/// Optional generator keys inside a snapshot directory
pub const VALIDATOR_KEYS_FILE_NAME: &str = "validator_keys.json";

/// Legacy chain data frozen at the snapshot height
pub trait SnapshotSource {
    /// Every account at the snapshot height
    fn accounts(&self) -> Result<Vec<Account>, GenesisError>;

    /// Encoded unregistered legacy accounts
    fn legacy_blob(&self) -> Result<Vec<u8>, GenesisError>;

    /// Encoded per-round delegate vote weights
    fn vote_weights_blob(&self) -> Result<Vec<u8>, GenesisError>;

    /// Generator keys of delegates that forged or registered keys
    fn validator_keys(&self) -> Result<ValidatorKeys, GenesisError>;
}

/// Snapshot already held in memory
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Accounts
    pub accounts: Vec<Account>,
    /// Encoded unregistered legacy accounts
    pub legacy_blob: Vec<u8>,
    /// Encoded vote weights
    pub vote_weights_blob: Vec<u8>,
    /// Generator keys
    pub validator_keys: ValidatorKeys,
}

impl SnapshotSource for Snapshot {
    fn accounts(&self) -> Result<Vec<Account>, GenesisError> {
        Ok(self.accounts.clone())
    }

    fn legacy_blob(&self) -> Result<Vec<u8>, GenesisError> {
        Ok(self.legacy_blob.clone())
    }

    fn vote_weights_blob(&self) -> Result<Vec<u8>, GenesisError> {
        Ok(self.vote_weights_blob.clone())
    }

    fn validator_keys(&self) -> Result<ValidatorKeys, GenesisError> {
        Ok(self.validator_keys.clone())
    }
}

/// Snapshot dumped to a directory
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    /// Open a snapshot directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a snapshot into the directory layout read by [`SnapshotDir`]
    pub fn write(root: impl AsRef<Path>, snapshot: &Snapshot) -> Result<Self, GenesisError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        fs::write(root.join(ACCOUNTS_FILE_NAME), serde_json::to_vec_pretty(&snapshot.accounts)?)?;
        fs::write(root.join(LEGACY_ACCOUNTS_FILE_NAME), &snapshot.legacy_blob)?;
        fs::write(root.join(VOTE_WEIGHTS_FILE_NAME), &snapshot.vote_weights_blob)?;
        if !snapshot.validator_keys.is_empty() {
            fs::write(
                root.join(VALIDATOR_KEYS_FILE_NAME),
                serde_json::to_vec_pretty(&snapshot.validator_keys)?,
            )?;
        }
        Ok(Self::new(root))
    }

    fn read(&self, file_name: &str) -> Result<Vec<u8>, GenesisError> {
        let path = self.root.join(file_name);
        debug!(target: "migrator::genesis", path = %path.display(), "Reading snapshot file");
        Ok(fs::read(path)?)
    }
}

impl SnapshotSource for SnapshotDir {
    fn accounts(&self) -> Result<Vec<Account>, GenesisError> {
        Ok(serde_json::from_slice(&self.read(ACCOUNTS_FILE_NAME)?)?)
    }

    fn legacy_blob(&self) -> Result<Vec<u8>, GenesisError> {
        self.read(LEGACY_ACCOUNTS_FILE_NAME)
    }

    fn vote_weights_blob(&self) -> Result<Vec<u8>, GenesisError> {
        self.read(VOTE_WEIGHTS_FILE_NAME)
    }

    fn validator_keys(&self) -> Result<ValidatorKeys, GenesisError> {
        if !self.root.join(VALIDATOR_KEYS_FILE_NAME).exists() {
            return Ok(ValidatorKeys::new());
        }
        Ok(serde_json::from_slice(&self.read(VALIDATOR_KEYS_FILE_NAME)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    #[test]
    fn test_snapshot_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot {
            accounts: vec![Account::new(Address::repeat_byte(1), U256::from(42))],
            legacy_blob: vec![1, 2, 3],
            vote_weights_blob: vec![4, 5],
            validator_keys: ValidatorKeys::from([(Address::repeat_byte(1), B256::repeat_byte(7))]),
        };

        let source = SnapshotDir::write(dir.path().join("snapshot"), &snapshot).unwrap();

        assert_eq!(source.accounts().unwrap(), snapshot.accounts);
        assert_eq!(source.legacy_blob().unwrap(), vec![1, 2, 3]);
        assert_eq!(source.vote_weights_blob().unwrap(), vec![4, 5]);
        assert_eq!(source.validator_keys().unwrap(), snapshot.validator_keys);
    }

    #[test]
    fn test_validator_keys_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let source = SnapshotDir::write(dir.path(), &Snapshot::default()).unwrap();

        assert!(source.validator_keys().unwrap().is_empty());
    }

    #[test]
    fn test_missing_accounts_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = SnapshotDir::new(dir.path());

        assert!(matches!(source.accounts(), Err(GenesisError::IoError(_))));
    }
}
