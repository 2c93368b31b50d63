use anyhow::Result;
use dayclip_api::setup;
use dayclip_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
