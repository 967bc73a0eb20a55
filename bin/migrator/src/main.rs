//! Migrator Binary
//!
//! Builds the genesis assets of the new chain from a frozen legacy snapshot.
//!
//! Usage:
//!   migrator --network mainnet --snapshot-height 16281107 --snapshot-dir ./snapshot

mod migrate;

use clap::Parser;
use migrate::MigrateArgs;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

const fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> eyre::Result<()> {
    let args = MigrateArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(args.verbosity))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(err) = args.run() {
        error!(target: "migrator::cli", error = %err, "Migration failed");
        return Err(err);
    }

    Ok(())
}
