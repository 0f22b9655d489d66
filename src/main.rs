use clap::Parser;
use param_miner::{load_config, setup_logging, Cli, CliRunner};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Load configuration
    let config = load_config(&args).await?;

    // Setup logging
    setup_logging(config.verbose, config.quiet)?;

    info!("Starting param-miner v{}", env!("CARGO_PKG_VERSION"));
    info!("Workers: {}", config.concurrency);
    info!("Request timeout: {:?}", config.timeout);
    info!("Method: {}", config.method);
    if let Some(proxy) = &config.proxy {
        info!("Proxy: {}", proxy);
    }

    let runner = CliRunner::new(config);

    if let Err(e) = runner.run().await {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
