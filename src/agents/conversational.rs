//! Conversational agent with tool access
//!
//! Sends the conversation history and the new prompt to the model through a
//! [`ToolCoordinator`], so the model can look things up (e.g. on Wolfram
//! Alpha) before it answers.

use crate::agents::Agent;
use crate::llm::LLMClient;
use crate::llm::coordinator::{ConversationMessage, ToolCallingConfig, ToolCoordinator};
use crate::tools::registry::ToolRegistry;
use crate::types::{Message, Result};
use async_trait::async_trait;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "Assistant is a large language model that helps students with \
mathematics. When a question needs an exact computation, a symbolic manipulation or a fact \
Assistant is unsure about, Assistant calls the available tools and bases its answer on their \
results. Assistant answers in natural language and keeps the conversation history in mind.";

pub struct ConversationalAgent {
    coordinator: ToolCoordinator,
    system_prompt: String,
}

impl ConversationalAgent {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        tool_registry: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            coordinator: ToolCoordinator::new(llm, tool_registry, config),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn build_messages(&self, prompt: &str, history: &[Message]) -> Vec<ConversationMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationMessage::system(&self.system_prompt));
        messages.extend(history.iter().map(ConversationMessage::from));
        messages.push(ConversationMessage::user(prompt));
        messages
    }
}

#[async_trait]
impl Agent for ConversationalAgent {
    async fn produce_answer(&self, prompt: &str, history: &[Message]) -> Result<String> {
        let result = self
            .coordinator
            .execute(self.build_messages(prompt, history))
            .await?;

        tracing::info!(
            iterations = result.iterations,
            tool_calls = result.tool_calls.len(),
            finish_reason = %result.finish_reason,
            total_tokens = result.total_usage.total_tokens,
            "Agent finished"
        );

        Ok(result.content)
    }
}
