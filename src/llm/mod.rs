//! LLM client and tool-calling loop
//!
//! - [`LLMClient`] - the one capability the agent needs from a model
//! - [`OpenAIClient`] - OpenAI-compatible chat completions over `reqwest`
//! - [`ToolCoordinator`] - runs tool calls until the model answers in text
//!
//! # Example
//!
//! ```ignore
//! use sensei::llm::{OpenAIClient, ToolCoordinator, ToolCallingConfig};
//!
//! let client = Arc::new(OpenAIClient::new(http, api_key, api_base, "gpt-3.5-turbo".into(), 0.0));
//! let coordinator = ToolCoordinator::new(client, registry, ToolCallingConfig::default());
//! let result = coordinator.execute(vec![ConversationMessage::user("What is 2+2?")]).await?;
//! ```

/// Core LLM client trait and response types.
pub mod client;
/// Multi-turn tool calling.
pub mod coordinator;
/// OpenAI-compatible chat completions client.
pub mod openai;

pub use client::{LLMClient, LLMResponse, TokenUsage};
pub use coordinator::{ConversationMessage, ToolCallingConfig, ToolCoordinator};
pub use openai::OpenAIClient;
