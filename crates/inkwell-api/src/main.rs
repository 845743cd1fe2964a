use inkwell_core::Config;

// mimalloc as the global allocator for lower fragmentation in containers
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Database, capabilities and routes
    let (_state, router) = inkwell_api::setup::initialize_app(config.clone()).await?;

    inkwell_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
