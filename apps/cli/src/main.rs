use anyhow::Context;
use clap::Parser;
use phonebook_cli::{Cli, connect, execute};
use phonebook_kernel::config::load_config;
use phonebook_kernel::domain::config::ApiConfig;
use phonebook_logger::{LevelFilter, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let action = cli.action().unwrap_or_else(|e| e.exit());

    let _log = Logger::builder(env!("CARGO_PKG_NAME")).level(LevelFilter::WARN).init()?;

    let mut cfg: ApiConfig =
        load_config(Some("phonebook")).context("Critical: Configuration is malformed")?;
    if let Some(url) = cli.url {
        cfg.database.url = url;
    }

    tracing::debug!(?action, url = %cfg.database.url, "Running phonebook command");
    let service = connect(&cfg.database).await?;
    execute(action, &service, &mut std::io::stdout().lock()).await
}
