//! Chat-platform message shapes, independent of any one platform's wire format.

use serde::{Deserialize, Serialize};

/// Kind of conversation a message was posted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    /// Direct message with the bot
    Im,
    Mpim,
    Channel,
    Group,
    #[serde(other)]
    Unknown,
}

/// Who wrote a message, as far as the platform tells us
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    /// Typed by a person through a client (carries a client message id)
    Human { client_msg_id: String },
    /// Posted by a bot integration
    Bot { bot_id: String },
    /// System messages, joins, edits and anything else
    Other,
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Authenticated download URL
    pub url_private: String,
    /// File extension as reported by the platform, e.g. `m4a`, `png`
    pub filetype: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A message as seen by the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: String,
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub files: Vec<Attachment>,
    pub author: Author,
}

impl ChatMessage {
    pub fn is_direct(&self) -> bool {
        self.channel_type == ChannelType::Im
    }

    pub fn first_attachment(&self) -> Option<&Attachment> {
        self.files.first()
    }

    /// Thread that replies to this message belong in.
    pub fn reply_thread(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Where to post a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTarget {
    pub channel: String,
    pub thread_ts: Option<String>,
}

impl PostTarget {
    pub fn channel(channel: impl Into<String>) -> Self {
        Self { channel: channel.into(), thread_ts: None }
    }

    pub fn thread(channel: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: Some(thread_ts.into()),
        }
    }
}

/// Reference to a message the bot posted, used to edit it later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}
