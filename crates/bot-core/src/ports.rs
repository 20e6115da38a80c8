//! Port traits at the hexagonal architecture boundary.
//!
//! These traits are defined here in `bot-core` (pure Rust).
//! Implementations live in `bot-platform` (HTTP and websocket adapters).
//! The core never imports platform code; it only depends on these traits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bot_types::{
    Result,
    chat::{ChatMessage, PostTarget, PostedMessage},
    message::{Completion, Turn},
    tool::ToolDefinition,
};

// ─── Completion Port ─────────────────────────────────────────

/// Request to send to a chat-completion model
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub turns: Vec<Turn>,
    /// Empty means plain completion; non-empty lets the model pick a tool
    pub tools: Vec<ToolDefinition>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Complete (non-streaming) response from the model
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub completion: Completion,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Non-streaming chat completion. A reply without choices comes back as
    /// `Completion::Empty`, not as an error.
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse>;
}

// ─── Media Port ──────────────────────────────────────────────

#[async_trait]
pub trait MediaPort: Send + Sync {
    /// Generate an image from a prompt and return its URL
    async fn generate_image(&self, prompt: &str) -> Result<String>;

    /// Convert text to encoded audio
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>>;

    /// Transcribe encoded audio to text
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;

    /// Download a public URL, e.g. a generated image
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

// ─── Chat Platform Port ──────────────────────────────────────

#[async_trait]
pub trait ChatPlatformPort: Send + Sync {
    async fn post_message(&self, target: &PostTarget, text: &str) -> Result<PostedMessage>;

    async fn update_message(&self, message: &PostedMessage, text: &str) -> Result<()>;

    /// All messages of a thread, oldest first, parent included
    async fn fetch_thread_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ChatMessage>>;

    async fn upload_file(&self, target: &PostTarget, path: &Path, title: &str) -> Result<()>;

    /// Download a file attached to a message (authenticated)
    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>>;
}

// ─── File Store Port ─────────────────────────────────────────

#[async_trait]
pub trait FileStorePort: Send + Sync {
    /// Create the working directory if it does not exist
    async fn ensure_root(&self) -> Result<()>;

    /// Write `data` under `name` in the working directory and return the full path
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf>;
}

/// The set of adapters a handler needs, cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct Ports {
    pub completion: Arc<dyn CompletionPort>,
    pub media: Arc<dyn MediaPort>,
    pub platform: Arc<dyn ChatPlatformPort>,
    pub files: Arc<dyn FileStorePort>,
}
