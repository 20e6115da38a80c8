//! Wires the adapters into a runtime and drives it from the socket listener.

use std::sync::Arc;

use tokio::sync::mpsc;

use bot_core::ports::Ports;
use bot_core::runtime::BotRuntime;
use bot_platform::llm::OpenAiCompatProvider;
use bot_platform::media::OpenAiMedia;
use bot_platform::slack::{SlackWebClient, SocketModeClient};
use bot_platform::storage::LocalFileStore;
use bot_types::{chat::ChatMessage, config::BotConfig};

const EVENT_QUEUE: usize = 64;

pub struct BotApp {
    runtime: Arc<BotRuntime>,
    socket: SocketModeClient,
}

impl BotApp {
    pub fn new(config: BotConfig) -> Self {
        let client = reqwest::Client::new();

        let ports = Ports {
            completion: Arc::new(OpenAiCompatProvider::with_client(client.clone(), &config.llm)),
            media: Arc::new(OpenAiMedia::new(client.clone(), &config.llm, config.media.clone())),
            platform: Arc::new(SlackWebClient::new(client.clone(), &config.slack)),
            files: Arc::new(LocalFileStore::new(&config.bot.files_dir)),
        };
        let socket = SocketModeClient::new(client, &config.slack);

        Self {
            runtime: Arc::new(BotRuntime::new(config, ports)),
            socket,
        }
    }

    /// Listen until ctrl-c. Each message gets its own task, so a slow media
    /// call never holds up other conversations.
    pub async fn run(self) -> anyhow::Result<()> {
        self.runtime.ports.files.ensure_root().await?;
        log::info!(
            "Starting bot in {} mode, media files under {}",
            self.runtime.config.bot.mode.label(),
            self.runtime.config.bot.files_dir
        );

        let (tx, mut rx) = mpsc::channel::<ChatMessage>(EVENT_QUEUE);
        let socket = self.socket;
        let listener = tokio::spawn(async move { socket.run(tx).await });

        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(message) = received else {
                        log::warn!("Socket listener stopped");
                        break;
                    };
                    spawn_handler(self.runtime.clone(), message);
                }
                _ = tokio::signal::ctrl_c() => {
                    log::warn!("ctrl-c: Stop requested");
                    break;
                }
            }
        }

        listener.abort();
        Ok(())
    }
}

fn spawn_handler(runtime: Arc<BotRuntime>, message: ChatMessage) {
    tokio::spawn(async move {
        if let Err(e) = runtime.handle_message(&message).await {
            log::error!("Failed to handle message {} in {}: {}", message.ts, message.channel, e);
        }
    });
}
