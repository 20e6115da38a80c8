use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use bot_app::config::{apply_env_overrides, load_config, validate};
use bot_app::logging::init_logging;
use bot_app::BotApp;
use bot_types::config::BotMode;

/// Slack DM bot backed by OpenAI
#[derive(Parser, Debug)]
#[command(name = "slack-gpt-bot", version)]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Bot generation to run: v1 (text), v2 (keywords) or v3 (tools)
    #[arg(long)]
    mode: Option<BotMode>,
    /// If true, just validate config and don't start
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("loading config")?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(mode) = cli.mode {
        config.bot.mode = mode;
    }
    validate(&config).context("validating config")?;

    info!(
        "Config: mode={} model={} files_dir={}",
        config.bot.mode.label(),
        config.llm.model,
        config.bot.files_dir
    );

    if cli.dry_run {
        return Ok(());
    }

    BotApp::new(config).run().await
}
