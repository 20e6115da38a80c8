//! Per-message handler.
//!
//! Every handled message follows the same protocol:
//! 1. `begin_turn` posts the placeholder status message
//! 2. the reply is computed from a text completion, keyword command or tool call
//! 3. `complete_turn` overwrites the placeholder with the result
//!
//! The runtime keeps no state between messages, so one instance can serve
//! concurrent handler tasks.

use bot_types::{
    Result,
    chat::{Author, ChatMessage, PostTarget, PostedMessage},
    config::{BotConfig, BotMode},
    message::{Completion, Turn},
};
use crate::dispatcher::ToolDispatcher;
use crate::history::resolve_history;
use crate::keyword::{parse_keyword, run_keyword};
use crate::markers;
use crate::ports::{ChatRequest, Ports};
use crate::tools::ToolRegistry;

/// The placeholder posted for one in-flight reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnHandle {
    pub status: PostedMessage,
    pub trigger_ts: String,
}

pub struct BotRuntime {
    pub config: BotConfig,
    pub ports: Ports,
    pub tools: ToolRegistry,
}

impl BotRuntime {
    pub fn new(config: BotConfig, ports: Ports) -> Self {
        Self {
            config,
            ports,
            tools: ToolRegistry::new(),
        }
    }

    /// Handle one incoming message event.
    ///
    /// Returns the text the placeholder was replaced with, or `None` when the
    /// message is not one the bot answers (not a DM, or posted by a bot).
    pub async fn handle_message(&self, message: &ChatMessage) -> Result<Option<String>> {
        if !message.is_direct() {
            log::debug!("Ignoring message {} in non-DM channel {}", message.ts, message.channel);
            return Ok(None);
        }
        if let Author::Bot { bot_id } = &message.author {
            log::debug!("Ignoring bot message {} from {}", message.ts, bot_id);
            return Ok(None);
        }

        let mode = self.config.bot.mode;
        log::info!("Handling message {} in {} ({} mode)", message.ts, message.channel, mode.label());

        if mode == BotMode::Keyword {
            if let Some(command) = parse_keyword(&message.text) {
                let handle = self.begin_turn(message, false).await?;
                let dispatcher = self.dispatcher();
                let text = run_keyword(&dispatcher, &command, message).await;
                self.complete_turn(&handle, &text).await?;
                return Ok(Some(text));
            }
        }

        let handle = self.begin_turn(message, true).await?;
        let text = match mode {
            BotMode::Text | BotMode::Keyword => self.text_reply(message).await,
            BotMode::Tools => self.tool_reply(message).await,
        };
        self.complete_turn(&handle, &text).await?;
        Ok(Some(text))
    }

    /// Post the placeholder, threaded under the trigger unless `threaded` is false.
    pub async fn begin_turn(&self, trigger: &ChatMessage, threaded: bool) -> Result<TurnHandle> {
        let target = if threaded {
            PostTarget::thread(&trigger.channel, trigger.reply_thread())
        } else {
            PostTarget::channel(&trigger.channel)
        };
        let status = self
            .ports
            .platform
            .post_message(&target, &self.config.bot.placeholder)
            .await?;
        Ok(TurnHandle {
            status,
            trigger_ts: trigger.ts.clone(),
        })
    }

    /// Replace the placeholder with the final text.
    pub async fn complete_turn(&self, handle: &TurnHandle, text: &str) -> Result<()> {
        self.ports.platform.update_message(&handle.status, text).await?;
        log::info!("Completed reply to {}", handle.trigger_ts);
        Ok(())
    }

    fn dispatcher(&self) -> ToolDispatcher<'_> {
        ToolDispatcher::new(&self.ports, &self.config.media)
    }

    async fn history(&self, trigger: &ChatMessage) -> Option<Vec<Turn>> {
        match resolve_history(trigger, self.ports.platform.as_ref(), &self.config.bot.placeholder).await {
            Ok(turns) => Some(turns),
            Err(e) => {
                log::warn!("Failed to fetch thread history: {}", e);
                None
            }
        }
    }

    fn request(&self, turns: Vec<Turn>, with_tools: bool) -> ChatRequest {
        ChatRequest {
            turns,
            tools: if with_tools { self.tools.definitions() } else { Vec::new() },
            model: self.config.llm.model.clone(),
            max_tokens: self.config.llm.max_tokens,
            temperature: self.config.llm.temperature,
        }
    }

    /// Plain completion: the model's text, or a marker.
    async fn text_reply(&self, trigger: &ChatMessage) -> String {
        let Some(turns) = self.history(trigger).await else {
            return markers::HISTORY_FAILED.to_string();
        };
        match self.ports.completion.chat_completion(self.request(turns, false)).await {
            Ok(response) => match response.completion {
                Completion::Text(text) => text,
                _ => markers::RESPONSE_EMPTY.to_string(),
            },
            Err(e) => {
                log::warn!("Completion failed: {}", e);
                markers::COMPLETION_FAILED.to_string()
            }
        }
    }

    /// Completion with the media tools offered; the dispatcher decides the rest.
    async fn tool_reply(&self, trigger: &ChatMessage) -> String {
        let Some(history) = self.history(trigger).await else {
            return markers::HISTORY_FAILED.to_string();
        };
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.push(Turn::system(&self.config.bot.tool_system_prompt));
        turns.extend(history);

        match self.ports.completion.chat_completion(self.request(turns, true)).await {
            Ok(response) => self.dispatcher().dispatch(response.completion, trigger).await,
            Err(e) => {
                log::warn!("Completion failed: {}", e);
                markers::COMPLETION_FAILED.to_string()
            }
        }
    }
}
