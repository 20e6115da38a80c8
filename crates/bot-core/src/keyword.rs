//! Keyword-prefix commands (v2 behaviour).
//!
//! A purely syntactic match on the first word of the message; the model is
//! never consulted about which action to run.

use bot_types::chat::{ChatMessage, PostTarget};
use crate::dispatcher::{render, ToolDispatcher};
use crate::markers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordCommand {
    Tts(String),
    DallE(String),
    Vision(String),
    Stt,
}

pub const KEYWORDS: [&str; 4] = ["tts", "dall-e", "vision", "stt"];

/// Match the first space-separated word against [`KEYWORDS`].
pub fn parse_keyword(text: &str) -> Option<KeywordCommand> {
    let first = text.split(' ').next()?;
    if !KEYWORDS.contains(&first) {
        return None;
    }
    let rest = text[first.len()..].trim_start().to_string();

    Some(match first {
        "tts" => KeywordCommand::Tts(rest),
        "dall-e" => KeywordCommand::DallE(rest),
        "vision" => KeywordCommand::Vision(rest),
        _ => KeywordCommand::Stt,
    })
}

/// Run a keyword command. Uploads go to the channel, not a thread.
pub async fn run_keyword(
    dispatcher: &ToolDispatcher<'_>,
    command: &KeywordCommand,
    trigger: &ChatMessage,
) -> String {
    log::info!("Running keyword command {:?} for message {}", command, trigger.ts);
    let target = PostTarget::channel(&trigger.channel);

    match command {
        KeywordCommand::Tts(text) => match dispatcher.speak(text, &target).await {
            Ok(_) => markers::TTS_DONE.to_string(),
            Err(e) => render(Err(e.into()), markers::TTS_FAILED, None),
        },
        KeywordCommand::DallE(prompt) => match dispatcher.generate_image_url(prompt).await {
            Ok(url) => markers::image_url(&url),
            Err(e) => render(Err(e.into()), markers::IMAGE_FAILED, None),
        },
        KeywordCommand::Vision(question) => {
            match dispatcher.answer_about_attachment(trigger, question).await {
                Ok(answer) => answer,
                Err(failure) => render(Err(failure), markers::VISION_FAILED, Some(markers::NO_IMAGE)),
            }
        }
        KeywordCommand::Stt => match dispatcher.transcribe_attachment(trigger).await {
            Ok(text) => text,
            Err(failure) => render(Err(failure), markers::STT_FAILED, Some(markers::NO_AUDIO)),
        },
    }
}

