mod command;
mod config;
mod logging;
mod router;
mod telegram;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use config::BotConfig;
use logging::LogWriter;
use router::Router;
use telegram::BotClient;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to appsettings.json
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = BotConfig::load(args.config.as_deref())?.apply_env();
    let token = config.token()?.to_string();

    let logger = Arc::new(LogWriter::new().context("Failed to initialize the log file")?);
    let client = Arc::new(BotClient::new(token).context("Failed to create HTTP client")?);

    let me = client.get_me().await.context("Failed to reach the Telegram API")?;
    let name = me.username.unwrap_or(me.first_name);

    let router = Router::new(client, logger);
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    println!("Start listening for @{}", name);
    router.run(cancel).await;
    println!("Stopped listening for @{}", name);

    Ok(())
}
