//! Tool-calling loop for the tutor agent
//!
//! [`ToolCoordinator`] drives a conversation with any [`LLMClient`]:
//!
//! 1. send the messages and the registry's tool definitions to the model
//! 2. run every tool call the model asks for and append the results
//! 3. go again until the model answers in plain text or the iteration limit hits
//!
//! ```rust,ignore
//! let coordinator = ToolCoordinator::new(client, registry, ToolCallingConfig::default());
//! let result = coordinator
//!     .execute(vec![ConversationMessage::user("integrate x^2 from 0 to 3")])
//!     .await?;
//! println!("{} ({} tool calls)", result.content, result.tool_calls.len());
//! ```

use crate::llm::client::{LLMClient, TokenUsage};
use crate::tools::registry::ToolRegistry;
use crate::types::{self, Result, ToolCall};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Answer returned when the model is still calling tools at the iteration limit.
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// Limits for one coordinated conversation.
#[derive(Debug, Clone)]
pub struct ToolCallingConfig {
    /// Maximum number of model round-trips.
    pub max_iterations: usize,
    /// Run the tool calls of one turn concurrently.
    pub parallel_execution: bool,
    /// Deadline for a single tool call.
    pub tool_timeout: Duration,
    /// Fail the whole conversation on the first tool error instead of
    /// reporting the error back to the model.
    pub stop_on_error: bool,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            parallel_execution: true,
            tool_timeout: Duration::from_secs(30),
            stop_on_error: false,
        }
    }
}

/// What happened when a tool was called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    /// Tool output, or `{"error": ...}` when it failed.
    pub result: serde_json::Value,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Why a coordinated conversation ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    /// The model answered without asking for tools.
    Stop,
    /// The iteration limit was reached.
    MaxIterations,
    /// The model asked for a tool that is not registered.
    UnknownTool(String),
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxIterations => write!(f, "max_iterations"),
            FinishReason::UnknownTool(t) => write!(f, "unknown_tool: {}", t),
        }
    }
}

/// A message in a tool-calling conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call this message answers (only for Tool role).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl ConversationMessage {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(MessageRole::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, result: &serde_json::Value) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(MessageRole::Tool, result.to_string())
        }
    }
}

impl From<&types::Message> for ConversationMessage {
    fn from(message: &types::Message) -> Self {
        let role = match message.role {
            types::MessageRole::System => MessageRole::System,
            types::MessageRole::User => MessageRole::User,
            types::MessageRole::Assistant => MessageRole::Assistant,
        };
        Self::plain(role, message.content.clone())
    }
}

/// Outcome of [`ToolCoordinator::execute`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorResult {
    /// Final text from the model.
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model round-trips performed.
    pub iterations: usize,
    pub finish_reason: FinishReason,
    pub total_usage: TokenUsage,
}

pub struct ToolCoordinator {
    client: Arc<dyn LLMClient>,
    registry: Arc<ToolRegistry>,
    config: ToolCallingConfig,
}

impl ToolCoordinator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        registry: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Run the loop starting from `messages` (system prompt, prior turns and
    /// the new user message, in that order).
    pub async fn execute(
        &self,
        mut messages: Vec<ConversationMessage>,
    ) -> Result<CoordinatorResult> {
        let tools = self.registry.get_tool_definitions();
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut total_usage = TokenUsage::default();

        for iteration in 1..=self.config.max_iterations {
            let response = self
                .client
                .generate_with_tools_and_history(&messages, &tools)
                .await?;

            if let Some(usage) = &response.usage {
                total_usage = total_usage.add(usage);
            }

            messages.push(ConversationMessage::assistant(
                &response.content,
                response.tool_calls.clone(),
            ));

            if response.tool_calls.is_empty() {
                return Ok(CoordinatorResult {
                    content: response.content,
                    tool_calls: records,
                    iterations: iteration,
                    finish_reason: FinishReason::Stop,
                    total_usage,
                });
            }

            if let Some(unknown) = response
                .tool_calls
                .iter()
                .find(|call| !self.registry.has_tool(&call.name))
            {
                tracing::warn!(tool = %unknown.name, "Model requested an unknown tool");
                return Ok(CoordinatorResult {
                    content: response.content,
                    tool_calls: records,
                    iterations: iteration,
                    finish_reason: FinishReason::UnknownTool(unknown.name.clone()),
                    total_usage,
                });
            }

            for record in self.execute_tool_calls(&response.tool_calls).await? {
                messages.push(ConversationMessage::tool_result(&record.id, &record.result));
                records.push(record);
            }
        }

        tracing::warn!(
            max_iterations = self.config.max_iterations,
            "Tool calling stopped at the iteration limit"
        );

        // The last message is a tool result here, never an answer
        Ok(CoordinatorResult {
            content: ITERATION_LIMIT_MESSAGE.to_string(),
            tool_calls: records,
            iterations: self.config.max_iterations,
            finish_reason: FinishReason::MaxIterations,
            total_usage,
        })
    }

    async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Result<Vec<ToolCallRecord>> {
        let records = if self.config.parallel_execution {
            join_all(calls.iter().map(|call| self.execute_single_tool(call))).await
        } else {
            let mut records = Vec::with_capacity(calls.len());
            for call in calls {
                records.push(self.execute_single_tool(call).await);
            }
            records
        };

        if self.config.stop_on_error {
            if let Some(failed) = records.iter().find(|r| !r.success) {
                return Err(types::AppError::Tool(format!(
                    "{} failed: {}",
                    failed.name,
                    failed.error.as_deref().unwrap_or("unknown error")
                )));
            }
        }

        Ok(records)
    }

    async fn execute_single_tool(&self, call: &ToolCall) -> ToolCallRecord {
        let start = Instant::now();
        let outcome = timeout(
            self.config.tool_timeout,
            self.registry.execute(&call.name, call.arguments.clone()),
        )
        .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (result, error) = match outcome {
            Ok(Ok(value)) => (value, None),
            Ok(Err(e)) => (serde_json::json!({ "error": e.to_string() }), Some(e.to_string())),
            Err(_) => (
                serde_json::json!({ "error": "Tool execution timed out" }),
                Some("Tool execution timed out".to_string()),
            ),
        };

        tracing::debug!(
            tool = %call.name,
            duration_ms,
            success = error.is_none(),
            "Tool call finished"
        );

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            success: error.is_none(),
            duration_ms,
            error,
        }
    }
}
