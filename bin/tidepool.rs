use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use url::Url;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use tidepool::{Deployer, RpcClient, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    let level = match settings.network.log_level.as_deref() {
        Some(level) => LevelFilter::from_str(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
        None => LevelFilter::Info,
    };

    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let rpc_url = Url::parse(&settings.network.rpc_url).context("Invalid RPC URL")?;
    let signer = PrivateKeySigner::from_str(&settings.network.private_key)
        .context("Invalid signer private key")?;

    let client = RpcClient::new(rpc_url, signer, settings.contracts.clone());
    let owner = client.signer();

    info!(
        "Deploying {} pools, {} position steps and {} swaps as {}",
        settings.pools.len(),
        settings.positions.len(),
        settings.swaps.len(),
        owner
    );

    let deployment = Deployer::new(&client, &settings, owner).run();

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    #[cfg(unix)]
    let result = tokio::select! {
        result = deployment => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal (Ctrl+C), aborting deployment...");
            None
        },
        _ = sigterm_stream.recv() => {
            info!("Received SIGTERM, aborting deployment...");
            None
        },
    };

    #[cfg(not(unix))]
    let result = tokio::select! {
        result = deployment => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal (Ctrl+C), aborting deployment...");
            None
        },
    };

    match result {
        Some(Ok(report)) => {
            for (name, address) in &report.pools {
                println!("{}={}", tidepool::deploy::pool_env_key(name), address);
            }
            info!(
                "Deployment finished: {} mints, {} swaps, {} positions owned",
                report.mints.len(),
                report.swaps.len(),
                report.positions.len()
            );
            Ok(())
        }
        Some(Err(e)) => {
            error!("Deployment failed: {:#}", e);
            Err(e.into())
        }
        // Interrupted runs can be repeated; existing pools are reused
        None => Ok(()),
    }
}
