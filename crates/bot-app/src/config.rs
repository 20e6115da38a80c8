//! Configuration loading: TOML file, then environment overrides.

use std::path::Path;

use bot_types::{BotError, Result, config::BotConfig};

pub const ENV_SLACK_APP_TOKEN: &str = "SLACK_APP_TOKEN";
pub const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_API_BASE: &str = "OPENAI_API_BASE";

pub fn parse_config(text: &str) -> Result<BotConfig> {
    toml::from_str(text).map_err(|e| BotError::Config(e.to_string()))
}

/// Read `path` if given, otherwise start from defaults.
pub fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    let Some(path) = path else {
        return Ok(BotConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| BotError::Fs {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::info!("Loaded config from {}", path.display());
    parse_config(&text)
}

/// Secrets from the environment win over the file. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut BotConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(token) = get(ENV_SLACK_APP_TOKEN) {
        config.slack.app_token = token;
    }
    if let Some(token) = get(ENV_SLACK_BOT_TOKEN) {
        config.slack.bot_token = token;
    }
    if let Some(key) = get(ENV_OPENAI_API_KEY) {
        config.llm.api_key = key;
    }
    if let Some(base) = get(ENV_OPENAI_API_BASE) {
        config.llm.api_base = Some(base);
    }
}

/// Every credential must be present before connecting.
pub fn validate(config: &BotConfig) -> Result<()> {
    let missing: Vec<&str> = [
        (ENV_SLACK_APP_TOKEN, config.slack.app_token.as_str()),
        (ENV_SLACK_BOT_TOKEN, config.slack.bot_token.as_str()),
        (ENV_OPENAI_API_KEY, config.llm.api_key.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BotError::Config(format!("missing credentials: {}", missing.join(", "))))
    }
}
