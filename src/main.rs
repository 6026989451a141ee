use anyhow::Result;
use deal_junk_signal::{
    app::JunkSignalApp,
    config,
    infrastructure::{directories, logging, shutdown::Shutdown},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging, &paths)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signals();

    let app = JunkSignalApp::initialize(config, paths, shutdown).await?;
    app.run().await
}
