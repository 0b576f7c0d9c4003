mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use cv_relay::core::config::Config;
use cv_relay::infrastructure::logging::init_logging;
use cv_relay::services::health::HealthCheck;
use cv_relay::services::processor::CvProcessor;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("cv-relay")?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let processor = CvProcessor::new(config);
            processor.start().await
        }
        Command::Health => {
            let passed = HealthCheck::check_all(&config).await;
            if !passed {
                std::process::exit(1);
            }
            info!("Health check passed");
            Ok(())
        }
    }
}
