//! Conversation history reconstruction.
//!
//! The chat platform is the system of record: every request rebuilds its
//! context from the thread the trigger message lives in.

use bot_types::{
    Result,
    chat::{Author, ChatMessage},
    message::Turn,
};
use crate::ports::ChatPlatformPort;

/// Build the ordered turn list for `trigger`.
///
/// Threaded triggers pull every reply of the thread; a top-level trigger is a
/// single user turn. No truncation is applied, so a long thread yields a long
/// context.
pub async fn resolve_history(
    trigger: &ChatMessage,
    threads: &dyn ChatPlatformPort,
    placeholder: &str,
) -> Result<Vec<Turn>> {
    let Some(thread_ts) = trigger.thread_ts.as_deref() else {
        return Ok(vec![Turn::user(&trigger.text)]);
    };

    let replies = threads.fetch_thread_replies(&trigger.channel, thread_ts).await?;
    let turns: Vec<Turn> = replies
        .iter()
        .filter_map(|msg| classify(msg, placeholder))
        .collect();

    log::debug!(
        "Resolved {} turns from {} thread messages in {}",
        turns.len(),
        replies.len(),
        thread_ts
    );
    Ok(turns)
}

/// Map one thread message to a turn, or drop it.
///
/// The bot's own placeholder is dropped so an in-flight status never becomes
/// context. Messages with neither author marker are ignored.
pub fn classify(msg: &ChatMessage, placeholder: &str) -> Option<Turn> {
    match &msg.author {
        Author::Human { .. } => Some(Turn::user(&msg.text)),
        Author::Bot { .. } if msg.text != placeholder => Some(Turn::assistant(&msg.text)),
        Author::Bot { .. } | Author::Other => None,
    }
}
