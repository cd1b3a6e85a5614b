mod cli;
mod config;
mod service;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use service::GatewayService;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    let gateway = GatewayService::new(config);
    gateway.run(cli.command).await
}
