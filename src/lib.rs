//! # Sensei - math tutor server
//!
//! An HTTP service that answers math questions. A question arrives as a
//! multipart form, is placed into one of two prompt templates (a full worked
//! solution, or a doubt-clearing explanation) and handed to a conversational
//! agent. The agent talks to an OpenAI-compatible chat model that may call
//! Wolfram Alpha before it answers.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use sensei::{AppState, SenseiConfig, agents::Tutor, api::routes::create_router};
//! use std::sync::Arc;
//!
//! let config = SenseiConfig::load("sensei.toml")?;
//! let tutor = Tutor::initialize(&config)?;
//! let app = create_router(AppState::new(config, tutor));
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - The tool-calling agent and the tutor in front of it
//! - [`api`] - REST API handlers and routes
//! - [`llm`] - Chat-completions client and tool-calling loop
//! - [`memory`] - Conversation memory, shared or per session
//! - [`prompts`] - The two question templates
//! - [`tools`] - Tool trait, registry and the Wolfram Alpha tool
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - Configuration loading
//!
//! ## Configuration
//!
//! Settings live in `sensei.toml` (all optional). Credentials are read from
//! the environment variables the file names, `OPENAI_API_KEY` and
//! `WOLFRAM_ALPHA_APPID` by default; a `.env` file is honoured.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Conversational agent and tutor.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM client and tool-calling loop.
pub mod llm;
/// Conversation memory.
pub mod memory;
/// Question templates.
pub mod prompts;
/// Tools the agent may call.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, Tutor};
pub use llm::{LLMClient, LLMResponse};
pub use memory::{ConversationMemory, MemoryStore};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::config::SenseiConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<SenseiConfig>,
    /// The tutor answering every request
    pub tutor: Arc<Tutor>,
}

impl AppState {
    pub fn new(config: SenseiConfig, tutor: Tutor) -> Self {
        Self {
            config: Arc::new(config),
            tutor: Arc::new(tutor),
        }
    }
}
