//! Media tool definitions, tool registry, and tool-call parsing.
//!
//! Tools follow the OpenAI function-calling schema.

use std::collections::HashMap;
use bot_types::message::ToolCallRequest;
use bot_types::tool::{
    ToolDefinition, ToolParameters, ToolRequest,
    GENERATE_IMAGE, GENERATE_STT, GENERATE_TTS, GENERATE_VISION,
};
use serde_json::{json, Map, Value};

/// Registry of tools offered to the model
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_builtins();
        registry
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Definitions sorted by name so request bodies are stable
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().cloned().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    fn register_builtins(&mut self) {
        self.register(Self::image_tool());
        self.register(Self::tts_tool());
        self.register(Self::stt_tool());
        self.register(Self::vision_tool());
    }

    fn single_string_parameter(name: &str, description: &str) -> ToolParameters {
        let mut props = Map::new();
        props.insert(name.to_string(), json!({
            "type": "string",
            "description": description
        }));

        ToolParameters {
            schema_type: "object".to_string(),
            properties: props,
            required: vec![name.to_string()],
        }
    }

    fn image_tool() -> ToolDefinition {
        ToolDefinition {
            name: GENERATE_IMAGE.to_string(),
            description: "Generate image basing on description".to_string(),
            parameters: Some(Self::single_string_parameter(
                "description",
                "Description of the image, e.g. a house under an apple tree",
            )),
        }
    }

    fn tts_tool() -> ToolDefinition {
        ToolDefinition {
            name: GENERATE_TTS.to_string(),
            description: "Generate or convert from text to speech".to_string(),
            parameters: Some(Self::single_string_parameter(
                "input_text",
                "Text to be converted to speech",
            )),
        }
    }

    fn stt_tool() -> ToolDefinition {
        ToolDefinition {
            name: GENERATE_STT.to_string(),
            description: "Transcript or convert from speech to text".to_string(),
            parameters: None,
        }
    }

    fn vision_tool() -> ToolDefinition {
        ToolDefinition {
            name: GENERATE_VISION.to_string(),
            description: "Answer question basing on the input image or photo".to_string(),
            parameters: Some(Self::single_string_parameter(
                "question",
                "Question regarding to the input image or photo",
            )),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON arguments string into a serde_json::Value
pub fn parse_tool_args(args: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(args)
}

/// Resolve a raw tool call into a [`ToolRequest`], once.
///
/// Unknown names fall back to `Unknown`; known names with bad arguments
/// become `Malformed`. `generate_stt` takes no arguments and ignores them.
pub fn parse_tool_request(call: &ToolCallRequest) -> ToolRequest {
    let name = call.function.name.as_str();
    match name {
        GENERATE_STT => ToolRequest::GenerateStt,
        GENERATE_IMAGE => match required_string(&call.function.arguments, "description") {
            Ok(description) => ToolRequest::GenerateImage { description },
            Err(reason) => malformed(name, reason),
        },
        GENERATE_TTS => match required_string(&call.function.arguments, "input_text") {
            Ok(input_text) => ToolRequest::GenerateTts { input_text },
            Err(reason) => malformed(name, reason),
        },
        GENERATE_VISION => match required_string(&call.function.arguments, "question") {
            Ok(question) => ToolRequest::GenerateVision { question },
            Err(reason) => malformed(name, reason),
        },
        other => ToolRequest::Unknown { name: other.to_string() },
    }
}

fn required_string(arguments: &str, key: &str) -> Result<String, String> {
    let args = parse_tool_args(arguments).map_err(|e| e.to_string())?;
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(format!("missing argument: {}", key)),
        Some(other) => Ok(other.to_string()),
    }
}

fn malformed(name: &str, reason: String) -> ToolRequest {
    ToolRequest::Malformed {
        name: name.to_string(),
        reason,
    }
}
