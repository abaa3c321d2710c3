//! Product copywriting through an injected chat-completion collaborator:
//! prompt building, response validation, sanitising and retry.

pub mod client;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod response;
pub mod sanitize;

pub use client::{CompletionClient, OpenAiClient};
pub use error::CopyError;
pub use generator::CopyWriter;
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use response::parse_response;
