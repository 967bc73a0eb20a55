//! Migrate command
//!
//! Reads a snapshot directory and writes the genesis assets document.

use alloy_primitives::B64;
use clap::Parser;
use eyre::WrapErr;
use migrator_genesis::{
    GenesisAssetsBuilder, NetworkType, SnapshotConfig, SnapshotDir,
    constants::GENESIS_ASSETS_FILE_NAME,
};
use std::path::PathBuf;
use tracing::info;

/// Migrate command arguments
#[derive(Debug, Parser)]
#[command(name = "migrator")]
#[command(about = "Build genesis assets from a legacy chain snapshot")]
pub(crate) struct MigrateArgs {
    /// Network name or network identifier of the legacy chain
    #[arg(long, env = "MIGRATOR_NETWORK", default_value = "devnet")]
    pub(crate) network: NetworkType,

    /// Height the legacy chain was frozen at
    #[arg(long, env = "MIGRATOR_SNAPSHOT_HEIGHT")]
    pub(crate) snapshot_height: u32,

    /// Directory holding the snapshot dump
    #[arg(long, env = "MIGRATOR_SNAPSHOT_DIR")]
    pub(crate) snapshot_dir: PathBuf,

    /// Output directory
    #[arg(long, short = 'o', default_value = "data/genesis")]
    pub(crate) output: PathBuf,

    /// Token ID override, 8 bytes hex
    #[arg(long)]
    pub(crate) token_id: Option<B64>,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub(crate) verbosity: u8,
}

impl MigrateArgs {
    /// Snapshot configuration selected by the arguments
    pub(crate) fn config(&self) -> SnapshotConfig {
        let config = SnapshotConfig::new(self.network, self.snapshot_height);
        match self.token_id {
            Some(token_id) => config.with_token_id(token_id),
            None => config,
        }
    }

    /// Run the migration, returning the path written
    pub(crate) fn run(&self) -> eyre::Result<PathBuf> {
        let config = self.config();
        config.validate().wrap_err("invalid snapshot configuration")?;

        info!(
            target: "migrator::cli",
            network = config.network.name(),
            snapshot_height = config.snapshot_height,
            snapshot_round = config.snapshot_round()?,
            snapshot_dir = %self.snapshot_dir.display(),
            "Starting migration"
        );

        let source = SnapshotDir::new(&self.snapshot_dir);
        let assets = GenesisAssetsBuilder::new(config)
            .build(&source)
            .wrap_err_with(|| {
                format!("failed to build genesis assets from {}", self.snapshot_dir.display())
            })?;

        std::fs::create_dir_all(&self.output)
            .wrap_err_with(|| format!("failed to create {}", self.output.display()))?;
        let path = self.output.join(GENESIS_ASSETS_FILE_NAME);
        assets.write_json(&path).wrap_err_with(|| format!("failed to write {}", path.display()))?;

        info!(
            target: "migrator::cli",
            path = %path.display(),
            digest = %assets.digest()?,
            "Genesis assets written"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use migrator_genesis::{
        Account,
        codec::{encode_legacy_accounts, encode_vote_weights},
        source::Snapshot,
        types::{DelegateRecord, DelegateWeight, RoundVoteWeights, VoteWeights},
    };

    fn parse(args: &[&str]) -> MigrateArgs {
        MigrateArgs::try_parse_from(std::iter::once("migrator").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&[
            "--network",
            "mainnet",
            "--snapshot-height",
            "16281107",
            "--snapshot-dir",
            "/tmp/snapshot",
            "-vv",
        ]);

        assert_eq!(args.network, NetworkType::Mainnet);
        assert_eq!(args.output, PathBuf::from("data/genesis"));
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.config().token_id, B64::ZERO);
    }

    #[test]
    fn test_token_id_override() {
        let args = parse(&[
            "--snapshot-height",
            "10815",
            "--snapshot-dir",
            "/tmp/snapshot",
            "--token-id",
            "0400000100000000",
        ]);

        assert_eq!(args.config().token_id_hex(), "0400000100000000");
    }

    #[test]
    fn test_unknown_network_rejected() {
        let result = MigrateArgs::try_parse_from([
            "migrator",
            "--network",
            "betanet",
            "--snapshot-height",
            "1",
            "--snapshot-dir",
            "/tmp",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_writes_assets() {
        let dir = tempfile::tempdir().unwrap();
        let delegate = Address::repeat_byte(0xaa);
        let vote_weights = VoteWeights {
            vote_weights: vec![RoundVoteWeights {
                round: 103,
                delegates: vec![DelegateWeight { address: delegate, vote_weight: U256::from(1) }],
            }],
        };
        let snapshot = Snapshot {
            accounts: vec![
                Account::new(delegate, U256::from(10)).with_delegate(DelegateRecord::new("d1")),
            ],
            legacy_blob: encode_legacy_accounts(&[]),
            vote_weights_blob: encode_vote_weights(&vote_weights),
            ..Default::default()
        };
        SnapshotDir::write(dir.path().join("snapshot"), &snapshot).unwrap();

        let args = MigrateArgs {
            network: NetworkType::Devnet,
            snapshot_height: 10_815,
            snapshot_dir: dir.path().join("snapshot"),
            output: dir.path().join("out"),
            token_id: None,
            verbosity: 0,
        };

        let path = args.run().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"module\": \"legacy\""));
    }

    #[test]
    fn test_run_fails_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let args = MigrateArgs {
            network: NetworkType::Devnet,
            snapshot_height: 10_815,
            snapshot_dir: dir.path().join("missing"),
            output: dir.path().join("out"),
            token_id: None,
            verbosity: 0,
        };

        assert!(args.run().is_err());
        assert!(!dir.path().join("out").join(GENESIS_ASSETS_FILE_NAME).exists());
    }
}
