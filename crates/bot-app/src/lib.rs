//! Slack GPT bot composition root.
//!
//! Loads the configuration, builds the Slack and OpenAI adapters and hands
//! them to the core runtime.

pub mod app;
pub mod config;
pub mod logging;

#[cfg(test)]
mod tests;

pub use app::BotApp;
