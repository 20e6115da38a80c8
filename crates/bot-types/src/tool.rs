use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BotError;

/// Definition of a tool that the model can invoke.
/// Follows the OpenAI function-calling schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Tools without arguments omit the schema entirely
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<ToolParameters>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String, // always "object"
    pub properties: serde_json::Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
}

pub const GENERATE_IMAGE: &str = "generate_image";
pub const GENERATE_TTS: &str = "generate_tts";
pub const GENERATE_STT: &str = "generate_stt";
pub const GENERATE_VISION: &str = "generate_vision";

/// A tool call resolved into one of the supported actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    GenerateImage { description: String },
    GenerateTts { input_text: String },
    GenerateStt,
    GenerateVision { question: String },
    /// The model named a tool we do not offer
    Unknown { name: String },
    /// A known tool whose arguments did not parse or lacked a required key
    Malformed { name: String, reason: String },
}

impl ToolRequest {
    pub fn name(&self) -> &str {
        match self {
            ToolRequest::GenerateImage { .. } => GENERATE_IMAGE,
            ToolRequest::GenerateTts { .. } => GENERATE_TTS,
            ToolRequest::GenerateStt => GENERATE_STT,
            ToolRequest::GenerateVision { .. } => GENERATE_VISION,
            ToolRequest::Unknown { name } | ToolRequest::Malformed { name, .. } => name,
        }
    }
}

/// Successful outcome of a media action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSuccess {
    pub text: String,
    /// File written to the working directory, if the action produced one
    pub file: Option<PathBuf>,
}

impl ToolSuccess {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), file: None }
    }

    pub fn with_file(text: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            file: Some(file.into()),
        }
    }
}

/// Why a media action failed
#[derive(Debug, Clone)]
pub enum ToolFailure {
    /// The action needs a file on the triggering message and there was none
    MissingAttachment,
    /// Required argument absent or unparsable
    InvalidArguments(String),
    /// Network, API, or filesystem failure while running the action
    Upstream(BotError),
}

impl From<BotError> for ToolFailure {
    fn from(e: BotError) -> Self {
        ToolFailure::Upstream(e)
    }
}

pub type ToolResult = std::result::Result<ToolSuccess, ToolFailure>;
