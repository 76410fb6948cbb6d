use anyhow::Context;
use phonebook_kernel::config::load_config;
use phonebook_kernel::domain::config::ApiConfig;
use phonebook_logger::Logger;
use phonebook_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("phonebook")).context("Critical: Configuration is malformed")?;

    let _log = Logger::builder(env!("CARGO_PKG_NAME")).config(&cfg.logging)?.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
