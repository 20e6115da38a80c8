//! Slack wire shapes and their translation into [`ChatMessage`].

use serde::Deserialize;
use serde_json::Value;

use bot_types::{
    Result, BotError,
    chat::{Attachment, Author, ChannelType, ChatMessage},
};

/// Message subtypes that carry something a person wrote.
/// Edits, deletions, joins and the like are skipped.
const HANDLED_SUBTYPES: [&str; 2] = ["file_share", "thread_broadcast"];

/// A message as Slack serializes it in events and in `conversations.replies`
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub channel: Option<String>,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel_type: Option<ChannelType>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub files: Vec<WireFile>,
    #[serde(default)]
    pub client_msg_id: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireFile {
    #[serde(default)]
    pub url_private: Option<String>,
    #[serde(default)]
    pub filetype: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl WireMessage {
    /// A client message id marks a human even when a bot id is also present.
    pub fn author(&self) -> Author {
        if let Some(ref id) = self.client_msg_id {
            Author::Human { client_msg_id: id.clone() }
        } else if let Some(ref id) = self.bot_id {
            Author::Bot { bot_id: id.clone() }
        } else {
            Author::Other
        }
    }

    pub fn is_handled_subtype(&self) -> bool {
        match self.subtype.as_deref() {
            None => true,
            Some(subtype) => HANDLED_SUBTYPES.contains(&subtype),
        }
    }

    /// Convert to the platform-neutral shape. `channel` and `channel_type`
    /// fill in what thread listings leave out.
    pub fn into_chat_message(self, channel: &str, channel_type: ChannelType) -> ChatMessage {
        let author = self.author();
        let files = self
            .files
            .into_iter()
            .filter_map(|f| {
                Some(Attachment {
                    url_private: f.url_private?,
                    filetype: f.filetype,
                    name: f.name,
                })
            })
            .collect();

        ChatMessage {
            channel: self.channel.unwrap_or_else(|| channel.to_string()),
            ts: self.ts,
            thread_ts: self.thread_ts,
            text: self.text,
            channel_type: self.channel_type.unwrap_or(channel_type),
            files,
            author,
        }
    }
}

/// One frame received over the Socket Mode websocket
#[derive(Debug, PartialEq)]
pub enum SocketFrame {
    Hello,
    /// The server is about to close this connection; open a new one
    Disconnect { reason: String },
    /// An envelope to acknowledge. `message` is set when it carried a
    /// message event the bot should see.
    Envelope {
        envelope_id: String,
        message: Option<ChatMessage>,
    },
    Other,
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Deserialize)]
struct EventsApiPayload {
    event: Value,
}

pub fn decode_frame(text: &str) -> Result<SocketFrame> {
    let raw: RawFrame = serde_json::from_str(text)?;

    match raw.frame_type.as_str() {
        "hello" => Ok(SocketFrame::Hello),
        "disconnect" => Ok(SocketFrame::Disconnect {
            reason: raw.reason.unwrap_or_default(),
        }),
        frame_type => {
            let Some(envelope_id) = raw.envelope_id else {
                return Ok(SocketFrame::Other);
            };
            let message = match (frame_type, raw.payload) {
                ("events_api", Some(payload)) => decode_message_event(payload)?,
                _ => None,
            };
            Ok(SocketFrame::Envelope { envelope_id, message })
        }
    }
}

fn decode_message_event(payload: Value) -> Result<Option<ChatMessage>> {
    let payload: EventsApiPayload = serde_json::from_value(payload)?;
    if payload.event.get("type").and_then(Value::as_str) != Some("message") {
        return Ok(None);
    }

    let wire: WireMessage = serde_json::from_value(payload.event)?;
    if !wire.is_handled_subtype() {
        log::debug!("Skipping message subtype {:?}", wire.subtype);
        return Ok(None);
    }
    let channel = wire
        .channel
        .clone()
        .ok_or_else(|| BotError::Platform("message event without channel".to_string()))?;
    Ok(Some(wire.into_chat_message(&channel, ChannelType::Unknown)))
}
