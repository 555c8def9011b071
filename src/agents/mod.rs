/// Tool-calling agent backed by an LLM client.
pub mod conversational;
/// Prompt/agent adapter used by the HTTP layer.
pub mod tutor;

use crate::types::{Message, Result};
use async_trait::async_trait;

pub use conversational::ConversationalAgent;
pub use tutor::Tutor;

/// Something that can answer a prompt, given the conversation so far.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Produce the answer text for `prompt`. `history` holds earlier turns of
    /// the same conversation, oldest first.
    async fn produce_answer(&self, prompt: &str, history: &[Message]) -> Result<String>;
}
