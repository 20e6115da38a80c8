use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// Top-level bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub slack: SlackConfig,
    pub llm: LlmConfig,
    pub media: MediaConfig,
    pub bot: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// App-level token used to open the Socket Mode connection (`xapp-...`)
    pub app_token: String,
    /// Bot user token used for Web API calls and file downloads (`xoxb-...`)
    pub bot_token: String,
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            app_token: String::new(),
            bot_token: String::new(),
            api_base: "https://slack.com/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-1106-preview".to_string(),
            api_key: String::new(),
            api_base: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl LlmConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    pub fn base_url(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

/// Models and parameters for the media actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
    pub vision_model: String,
    pub vision_max_tokens: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_model: "dall-e-2".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "nova".to_string(),
            stt_model: "whisper-1".to_string(),
            vision_model: "gpt-4-vision-preview".to_string(),
            vision_max_tokens: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub mode: BotMode,
    /// Status text posted while a reply is being computed
    pub placeholder: String,
    /// Directory for downloaded and generated media files
    pub files_dir: String,
    /// System turn prepended in tool mode
    pub tool_system_prompt: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            mode: BotMode::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            files_dir: "files".to_string(),
            tool_system_prompt: DEFAULT_TOOL_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Which generation of the bot to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotMode {
    /// Plain text completion
    #[serde(rename = "v1", alias = "text")]
    Text,
    /// Keyword-prefixed media commands, text completion otherwise
    #[serde(rename = "v2", alias = "keyword")]
    Keyword,
    /// Model-selected tool calls
    #[default]
    #[serde(rename = "v3", alias = "tools")]
    Tools,
}

impl BotMode {
    pub fn label(&self) -> &'static str {
        match self {
            BotMode::Text => "v1",
            BotMode::Keyword => "v2",
            BotMode::Tools => "v3",
        }
    }
}

impl FromStr for BotMode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "text" => Ok(BotMode::Text),
            "v2" | "keyword" => Ok(BotMode::Keyword),
            "v3" | "tools" => Ok(BotMode::Tools),
            other => Err(BotError::Config(format!("unknown bot mode: {}", other))),
        }
    }
}

const DEFAULT_PLACEHOLDER: &str = "Please wait...";

const DEFAULT_TOOL_SYSTEM_PROMPT: &str =
    "Use tool calls if the user mention about input image, picture or photo";
