//! Network and filesystem adapters implementing the `bot-core` ports.

pub mod llm;
pub mod media;
pub mod slack;
pub mod storage;
