pub mod openai;

pub use openai::{OpenAiChatModel, OpenAiConfig, DEFAULT_OPENAI_URL};
