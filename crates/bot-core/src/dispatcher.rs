//! Tool dispatch: turns a completion into the text shown to the user.
//!
//! Each media action runs once, with no retries. Actions return typed
//! results; only [`render`] collapses them to a status marker.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use bot_types::{
    BotError, Result,
    chat::{ChatMessage, PostTarget},
    config::MediaConfig,
    message::{Completion, Turn},
    tool::{ToolFailure, ToolRequest, ToolResult, ToolSuccess},
};
use crate::files::random_file_name;
use crate::markers;
use crate::ports::{ChatRequest, Ports};
use crate::tools::parse_tool_request;

pub struct ToolDispatcher<'a> {
    ports: &'a Ports,
    media: &'a MediaConfig,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(ports: &'a Ports, media: &'a MediaConfig) -> Self {
        Self { ports, media }
    }

    /// Exactly one of the text, tool-call, or invalid-response paths runs.
    pub async fn dispatch(&self, completion: Completion, trigger: &ChatMessage) -> String {
        match completion {
            Completion::Text(text) => text,
            Completion::ToolCall(call) => {
                let request = parse_tool_request(&call);
                self.execute(&request, trigger).await
            }
            Completion::Empty => markers::INVALID_RESPONSE.to_string(),
        }
    }

    /// Run one resolved tool request against the trigger's conversation.
    pub async fn execute(&self, request: &ToolRequest, trigger: &ChatMessage) -> String {
        log::info!("Dispatching tool {} for message {}", request.name(), trigger.ts);
        let target = PostTarget::thread(&trigger.channel, trigger.reply_thread());

        match request {
            ToolRequest::GenerateImage { description } => render(
                self.image_action(description, &target).await,
                markers::IMAGE_FAILED,
                None,
            ),
            ToolRequest::GenerateTts { input_text } => render(
                self.tts_action(input_text, &target).await,
                markers::TTS_FAILED,
                None,
            ),
            ToolRequest::GenerateStt => render(
                self.transcribe_attachment(trigger)
                    .await
                    .map(|text| ToolSuccess::text(markers::success(&text))),
                markers::STT_FAILED,
                Some(markers::NO_AUDIO),
            ),
            ToolRequest::GenerateVision { question } => render(
                self.answer_about_attachment(trigger, question)
                    .await
                    .map(ToolSuccess::text),
                markers::VISION_FAILED,
                Some(markers::NO_IMAGE),
            ),
            ToolRequest::Unknown { name } => {
                log::warn!("Model requested unknown tool: {}", name);
                markers::INVALID_FUNCTION.to_string()
            }
            ToolRequest::Malformed { name, reason } => render(
                Err(ToolFailure::InvalidArguments(format!("{}: {}", name, reason))),
                markers::INVALID_FUNCTION,
                None,
            ),
        }
    }

    async fn image_action(&self, description: &str, target: &PostTarget) -> ToolResult {
        let url = self.generate_image_url(description).await?;
        let path = self.publish_image(&url, target, description).await?;
        Ok(ToolSuccess::with_file(markers::IMAGE_DONE, path))
    }

    async fn tts_action(&self, input_text: &str, target: &PostTarget) -> ToolResult {
        let path = self.speak(input_text, target).await?;
        Ok(ToolSuccess::with_file(markers::TTS_DONE, path))
    }

    // ─── Building blocks shared with keyword mode ────────────

    pub(crate) async fn generate_image_url(&self, description: &str) -> Result<String> {
        self.ports.media.generate_image(description).await
    }

    /// Download a generated image, keep a local copy, and upload it.
    pub(crate) async fn publish_image(
        &self,
        url: &str,
        target: &PostTarget,
        title: &str,
    ) -> Result<std::path::PathBuf> {
        let bytes = self.ports.media.fetch(url).await?;
        let path = self
            .ports
            .files
            .write_file(&random_file_name("jpg"), &bytes)
            .await?;
        self.ports.platform.upload_file(target, &path, title).await?;
        Ok(path)
    }

    /// Synthesize speech, keep it as mp3, and upload it.
    pub(crate) async fn speak(
        &self,
        input_text: &str,
        target: &PostTarget,
    ) -> Result<std::path::PathBuf> {
        let audio = self.ports.media.synthesize_speech(input_text).await?;
        let path = self
            .ports
            .files
            .write_file(&random_file_name("mp3"), &audio)
            .await?;
        self.ports
            .platform
            .upload_file(target, &path, "Text To Speech")
            .await?;
        Ok(path)
    }

    /// Transcript of the first attached file. No API is called without one.
    pub(crate) async fn transcribe_attachment(
        &self,
        trigger: &ChatMessage,
    ) -> std::result::Result<String, ToolFailure> {
        let (bytes, name) = self.download_first_attachment(trigger).await?;
        let text = self.ports.media.transcribe(bytes, &name).await?;
        Ok(text)
    }

    /// Vision answer about the first attached image. No API is called without one.
    pub(crate) async fn answer_about_attachment(
        &self,
        trigger: &ChatMessage,
        question: &str,
    ) -> std::result::Result<String, ToolFailure> {
        let (bytes, _) = self.download_first_attachment(trigger).await?;
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&bytes));

        let req = ChatRequest {
            turns: vec![Turn::user_with_image(question, data_url)],
            tools: Vec::new(),
            model: self.media.vision_model.clone(),
            max_tokens: Some(self.media.vision_max_tokens),
            temperature: None,
        };
        let response = self.ports.completion.chat_completion(req).await?;
        match response.completion {
            Completion::Text(answer) => Ok(answer),
            _ => Err(BotError::Llm("vision reply carried no text".to_string()).into()),
        }
    }

    async fn download_first_attachment(
        &self,
        trigger: &ChatMessage,
    ) -> std::result::Result<(Vec<u8>, String), ToolFailure> {
        let attachment = trigger
            .first_attachment()
            .ok_or(ToolFailure::MissingAttachment)?;
        let bytes = self
            .ports
            .platform
            .download_attachment(&attachment.url_private)
            .await?;
        let name = random_file_name(&attachment.filetype);
        self.ports.files.write_file(&name, &bytes).await?;
        Ok((bytes, name))
    }
}

/// Collapse a tool result to the user-visible text. The cause of an upstream
/// failure is logged and dropped.
pub fn render(result: ToolResult, failure_marker: &str, missing_marker: Option<&str>) -> String {
    match result {
        Ok(success) => success.text,
        Err(ToolFailure::MissingAttachment) => missing_marker.unwrap_or(failure_marker).to_string(),
        Err(ToolFailure::InvalidArguments(reason)) => {
            log::warn!("Invalid tool arguments: {}", reason);
            markers::INVALID_ARGUMENTS.to_string()
        }
        Err(ToolFailure::Upstream(e)) => {
            log::warn!("Tool failed: {}", e);
            failure_marker.to_string()
        }
    }
}
