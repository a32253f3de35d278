use command_mux::{
    bot,
    config,
    core::{dispatcher::MuxBuilder, middleware::trace_invocations},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the multiplexer configuration
    let mux_config = config::load_default_config()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;
    let fuzzy = mux_config.fuzzy;

    // 4. Register commands and run their init hooks
    let mut builder: MuxBuilder = mux_config
        .into_builder()?
        .use_middleware(trace_invocations())
        .register(bot::commands::builtin_commands());
    if fuzzy {
        builder = builder.enable_fuzzy();
    }
    builder
        .initialize(&[])
        .inspect_err(|e| error!("Failed to initialize commands: {}", e))?;
    let mux = Arc::new(builder.build());

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, mux).await.map_err(Error::from)?;

    Ok(())
}
