use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BotError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Filesystem error: {path}: {message}")]
    Fs { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::Serialization(e.to_string())
    }
}
