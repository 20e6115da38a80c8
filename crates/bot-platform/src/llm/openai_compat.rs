//! OpenAI-compatible chat completion adapter.
//!
//! Speaks the `/v1/chat/completions` protocol over reqwest. Any provider
//! exposing the same API works by pointing `api_base` at it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use bot_core::ports::*;
use bot_types::{
    Result, BotError,
    config::LlmConfig,
    message::{Completion, ContentPart, FunctionCall, MessageContent, ToolCallRequest, Turn},
};

/// Provider that speaks the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Share one connection pool with the other adapters.
    pub fn with_client(client: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url().to_string(),
        }
    }

    pub(crate) fn build_request_body(req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.turns.iter().map(turn_to_json).collect();

        let mut body = json!({
            "model": req.model,
            "messages": messages,
        });
        if let Some(max_tokens) = req.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = req.temperature {
            body["temperature"] = json!(temperature);
        }

        if !req.tools.is_empty() {
            let tools: Vec<Value> = req
                .tools
                .iter()
                .map(|t| {
                    let mut function = json!({
                        "name": t.name,
                        "description": t.description,
                    });
                    if let Some(ref parameters) = t.parameters {
                        function["parameters"] = json!(parameters);
                    }
                    json!({
                        "type": "function",
                        "function": function,
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

#[async_trait]
impl CompletionPort for OpenAiCompatProvider {
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = Self::build_request_body(&req);
        log::debug!(
            "POST {} model={} turns={} tools={}",
            url,
            req.model,
            req.turns.len(),
            req.tools.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BotError::Llm(format!("HTTP {}: {}", status, text)));
        }

        let data: ApiResponse = response
            .json()
            .await
            .map_err(|e| BotError::Llm(e.to_string()))?;

        let completion = match data.choices.into_iter().next() {
            Some(choice) => parse_api_message(choice.message),
            None => {
                log::warn!("Completion response carried no choices");
                Completion::Empty
            }
        };
        let usage = data.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        if let Some(ref u) = usage {
            log::debug!("Token usage: {} prompt, {} completion", u.prompt_tokens, u.completion_tokens);
        }

        Ok(ChatResponse { completion, usage })
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunction,
}

#[derive(Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ─── Serialization helpers ───────────────────────────────────

fn turn_to_json(turn: &Turn) -> Value {
    let content = match &turn.content {
        MessageContent::Text(text) => json!(text),
        MessageContent::Parts(parts) => {
            let parts: Vec<Value> = parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => json!({ "type": "text", "text": text }),
                    ContentPart::ImageUrl { image_url } => json!({
                        "type": "image_url",
                        "image_url": { "url": image_url.url },
                    }),
                })
                .collect();
            json!(parts)
        }
    };

    json!({
        "role": turn.role.as_str(),
        "content": content,
    })
}

fn parse_api_message(api: ApiMessage) -> Completion {
    let tool_calls: Vec<ToolCallRequest> = api
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCallRequest {
            id: tc.id,
            function: FunctionCall {
                name: tc.function.name,
                arguments: tc.function.arguments,
            },
        })
        .collect();

    Completion::from_parts(api.content, tool_calls)
}
