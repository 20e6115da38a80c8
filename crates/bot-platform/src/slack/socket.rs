//! Slack Socket Mode listener.
//!
//! Opens a websocket with the app-level token, acknowledges every envelope
//! and forwards message events to a channel. The connection is reopened
//! whenever Slack drops it or asks for a refresh.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use bot_types::{Result, BotError, chat::ChatMessage, config::SlackConfig};
use super::events::{decode_frame, SocketFrame};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct SocketModeClient {
    client: reqwest::Client,
    api_base: String,
    app_token: String,
}

enum SessionEnd {
    Reconnect,
    ReceiverClosed,
}

impl SocketModeClient {
    pub fn new(client: reqwest::Client, config: &SlackConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            app_token: config.app_token.clone(),
        }
    }

    /// Ask Slack for a fresh websocket URL.
    pub async fn open_connection_url(&self) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/apps.connections.open", self.api_base))
            .bearer_auth(&self.app_token)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::Platform(format!("apps.connections.open: {}", e)))?;

        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = body.get("error").and_then(Value::as_str).unwrap_or("unknown_error");
            return Err(BotError::Platform(format!("apps.connections.open: {}", error)));
        }
        body.get("url")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| BotError::Platform("apps.connections.open: missing url".to_string()))
    }

    /// Forward message events to `events` until its receiver is dropped.
    pub async fn run(&self, events: mpsc::Sender<ChatMessage>) -> Result<()> {
        loop {
            match self.session(&events).await {
                Ok(SessionEnd::ReceiverClosed) => {
                    log::info!("Event receiver closed, stopping socket listener");
                    return Ok(());
                }
                Ok(SessionEnd::Reconnect) => {
                    log::info!("Reconnecting Socket Mode session");
                }
                Err(e) => {
                    log::warn!("Socket Mode session failed: {}", e);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    async fn session(&self, events: &mpsc::Sender<ChatMessage>) -> Result<SessionEnd> {
        let url = self.open_connection_url().await?;
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        log::info!("Socket Mode connected");
        let (mut write, mut read) = socket.split();

        while let Some(frame) = read.next().await {
            let frame = frame.map_err(|e| BotError::Network(e.to_string()))?;
            let text = match frame {
                Message::Text(text) => text,
                Message::Ping(data) => {
                    write
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| BotError::Network(e.to_string()))?;
                    continue;
                }
                Message::Close(_) => return Ok(SessionEnd::Reconnect),
                _ => continue,
            };

            let decoded = match decode_frame(&text) {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::warn!("Undecodable Socket Mode frame: {}", e);
                    continue;
                }
            };

            match decoded {
                SocketFrame::Hello => log::debug!("Socket Mode hello"),
                SocketFrame::Disconnect { reason } => {
                    log::info!("Socket Mode disconnect requested: {}", reason);
                    return Ok(SessionEnd::Reconnect);
                }
                SocketFrame::Envelope { envelope_id, message } => {
                    let ack = json!({ "envelope_id": envelope_id }).to_string();
                    write
                        .send(Message::Text(ack))
                        .await
                        .map_err(|e| BotError::Network(e.to_string()))?;

                    if let Some(message) = message {
                        if events.send(message).await.is_err() {
                            return Ok(SessionEnd::ReceiverClosed);
                        }
                    }
                }
                SocketFrame::Other => {}
            }
        }

        Ok(SessionEnd::Reconnect)
    }
}
