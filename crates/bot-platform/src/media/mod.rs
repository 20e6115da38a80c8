pub mod openai;

pub use openai::OpenAiMedia;
