//! ClipStudio CLI
//!
//! Command-line front end of the ClipStudio editing pipeline.
//!
//! # Usage
//!
//! ```bash
//! clipstudio cut --input talk.mp4 --start 00:05 --end 00:15 --output clip.mp4
//! clipstudio merge --base talk.mp4 --insert ad.mp4 --at 60 --preview
//! clipstudio speed --input talk.mp4 --start 10 --end 20 --factor 2 --output fast.mp4
//! clipstudio add-audio --video talk.mp4 --audio music.mp3 --volume 40 --loop --preview
//! clipstudio probe --input talk.mp4 --format json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, warn};

use clipstudio::adapters::{init_logging, LogFormat, LogLevel, TomlConfigAdapter};
use clipstudio::app::{AppContainer, DefaultAppContainer};
use clipstudio::cli::{commands, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TomlConfigAdapter::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.log_level = LogLevel::parse(level)?.as_str().to_string();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = LogFormat::parse(format)?;
    }

    init_logging(config.log_level(), config.log_format);
    debug!("Configuration: {:?}", config);

    let container = DefaultAppContainer::new(&config, cli.progress.sink());

    let result = tokio::select! {
        result = commands::execute(cli.command, &container) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cleaning up temporary files");
            Err(anyhow::anyhow!("Interrupted"))
        }
    };

    let purged = container.shutdown();
    if purged > 0 {
        debug!("Removed {} temporary file(s) on exit", purged);
    }

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
