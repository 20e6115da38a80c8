//! OpenAI media endpoints: image generation, speech synthesis, transcription.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use bot_core::ports::MediaPort;
use bot_types::{
    Result, BotError,
    config::{LlmConfig, MediaConfig},
};

pub struct OpenAiMedia {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    media: MediaConfig,
}

impl OpenAiMedia {
    pub fn new(client: reqwest::Client, llm: &LlmConfig, media: MediaConfig) -> Self {
        Self {
            client,
            api_key: llm.api_key.clone(),
            base_url: llm.base_url().to_string(),
            media,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Turn a non-2xx response into `BotError::Api`, keeping the body for the log.
async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BotError::Api(format!("{} failed ({}): {}", what, status, body)))
}

fn network(e: reqwest::Error) -> BotError {
    BotError::Network(e.to_string())
}

#[async_trait]
impl MediaPort for OpenAiMedia {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.media.image_model,
            "prompt": prompt,
            "size": self.media.image_size,
            "quality": self.media.image_quality,
            "n": 1,
        });
        let response = self
            .client
            .post(self.endpoint("/v1/images/generations"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let data: ImageResponse = check_status(response, "image generation")
            .await?
            .json()
            .await
            .map_err(|e| BotError::Api(e.to_string()))?;

        data.data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| BotError::Api("image generation returned no URL".to_string()))
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>> {
        let body = json!({
            "model": self.media.tts_model,
            "voice": self.media.tts_voice,
            "input": text,
        });
        let response = self
            .client
            .post(self.endpoint("/v1/audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let bytes = check_status(response, "speech synthesis")
            .await?
            .bytes()
            .await
            .map_err(network)?;
        Ok(bytes.to_vec())
    }

    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let part = Part::bytes(audio).file_name(file_name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("model", self.media.stt_model.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(self.endpoint("/v1/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        let text = check_status(response, "transcription")
            .await?
            .text()
            .await
            .map_err(network)?;
        Ok(text.trim_end().to_string())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(network)?;
        let bytes = check_status(response, "download")
            .await?
            .bytes()
            .await
            .map_err(network)?;
        Ok(bytes.to_vec())
    }
}
