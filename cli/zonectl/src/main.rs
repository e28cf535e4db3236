//! zonectl - availability-zone reconciliation for auto-scaling fleets.
//!
//! Removes a blacklisted AZ (and its subnets) from every in-scope group,
//! adds a whitelisted AZ, and marks instances stranded in the excluded
//! zone unhealthy so the scaling service replaces them.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zonectl::aws::AwsProvider;
use zonectl::cli::Cli;
use zonectl::driver::{Driver, RunConfig};
use zonectl::error;
use zonectl_reconcile::{ServiceFilter, ZonePolicy};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!(
        services = ?cli.services,
        blacklist_az = ?cli.blacklist_az,
        whitelist_az = ?cli.whitelist_az,
        dry_run = cli.dryrun,
        "starting zone reconciliation"
    );

    let filter = ServiceFilter::new(&cli.services)?;
    let policy = ZonePolicy::new(cli.blacklist_az, cli.whitelist_az);

    let provider = AwsProvider::from_env().await;
    let driver = Driver::new(
        &provider,
        &provider,
        RunConfig {
            filter,
            policy,
            dry_run: cli.dryrun,
        },
    );

    driver.run().await?;
    Ok(())
}
