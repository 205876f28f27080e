use anyhow::Context;
use vhub::kernel::config::load_config;
use vhub_logger::Logger;
use vhub_server::Server;

#[vhub_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    Server::builder().config(cfg).build().await?.run().await
}
