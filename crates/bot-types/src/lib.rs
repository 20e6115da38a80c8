pub mod message;
pub mod chat;
pub mod tool;
pub mod config;
pub mod error;


pub use error::BotError;
pub type Result<T> = std::result::Result<T, BotError>;
