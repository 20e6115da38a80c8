//! Slack Web API adapter.
//!
//! Every call authenticates with the bot token. Slack answers HTTP 200 for
//! most failures, so the `ok` flag in the body decides success.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use bot_core::ports::ChatPlatformPort;
use bot_types::{
    Result, BotError,
    chat::{ChannelType, ChatMessage, PostTarget, PostedMessage},
    config::SlackConfig,
};
use super::events::WireMessage;

pub struct SlackWebClient {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

#[derive(Deserialize)]
struct PostResponse {
    channel: String,
    ts: String,
}

#[derive(Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<WireMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct UploadUrlResponse {
    upload_url: String,
    file_id: String,
}

impl SlackWebClient {
    pub fn new(client: reqwest::Client, config: &SlackConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// POST a JSON body to a write method.
    async fn post_json(&self, method: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        Self::read_ok(method, response).await
    }

    /// GET a read method with query parameters.
    async fn get_query(&self, method: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(self.method_url(method))
            .bearer_auth(&self.bot_token)
            .query(query)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        Self::read_ok(method, response).await
    }

    async fn read_ok(method: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Platform(format!("{}: HTTP {}", method, status)));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::Platform(format!("{}: {}", method, e)))?;

        if body.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(body)
        } else {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            Err(BotError::Platform(format!("{}: {}", method, error)))
        }
    }
}

#[async_trait]
impl ChatPlatformPort for SlackWebClient {
    async fn post_message(&self, target: &PostTarget, text: &str) -> Result<PostedMessage> {
        let mut body = json!({
            "channel": target.channel,
            "text": text,
        });
        if let Some(ref thread_ts) = target.thread_ts {
            body["thread_ts"] = json!(thread_ts);
        }

        let posted: PostResponse = serde_json::from_value(self.post_json("chat.postMessage", &body).await?)?;
        Ok(PostedMessage {
            channel: posted.channel,
            ts: posted.ts,
        })
    }

    async fn update_message(&self, message: &PostedMessage, text: &str) -> Result<()> {
        let body = json!({
            "channel": message.channel,
            "ts": message.ts,
            "text": text,
        });
        self.post_json("chat.update", &body).await?;
        Ok(())
    }

    async fn fetch_thread_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut query = vec![("channel", channel), ("ts", thread_ts)];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }
            let page: RepliesResponse =
                serde_json::from_value(self.get_query("conversations.replies", &query).await?)?;

            messages.extend(
                page.messages
                    .into_iter()
                    .map(|m| m.into_chat_message(channel, ChannelType::Unknown)),
            );

            cursor = page
                .response_metadata
                .map(|meta| meta.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }

        log::debug!("Fetched {} messages from thread {} in {}", messages.len(), thread_ts, channel);
        Ok(messages)
    }

    async fn upload_file(&self, target: &PostTarget, path: &Path, title: &str) -> Result<()> {
        let data = tokio::fs::read(path).await.map_err(|e| BotError::Fs {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let length = data.len().to_string();

        let ticket: UploadUrlResponse = serde_json::from_value(
            self.get_query(
                "files.getUploadURLExternal",
                &[("filename", filename.as_str()), ("length", length.as_str())],
            )
            .await?,
        )?;

        let response = self
            .client
            .post(&ticket.upload_url)
            .bearer_auth(&self.bot_token)
            .body(data)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BotError::Platform(format!(
                "file upload: HTTP {}",
                response.status()
            )));
        }

        let mut body = json!({
            "files": [{ "id": ticket.file_id, "title": title }],
            "channel_id": target.channel,
        });
        if let Some(ref thread_ts) = target.thread_ts {
            body["thread_ts"] = json!(thread_ts);
        }
        self.post_json("files.completeUploadExternal", &body).await?;

        log::info!("Uploaded {} to {}", filename, target.channel);
        Ok(())
    }

    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bot_token)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Platform(format!("download {}: HTTP {}", url, status)));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
