//! Tools the tutor agent can call
//!
//! - [`registry`](crate::tools::registry) - the [`Tool`] trait and [`ToolRegistry`]
//! - [`wolfram`](crate::tools::wolfram) - Wolfram Alpha symbolic-math lookup
//!
//! The registry is built once at startup and injected into the agent:
//!
//! ```ignore
//! let wolfram = WolframAlphaTool::new(http, DEFAULT_WOLFRAM_API_BASE, app_id);
//! let registry = Arc::new(ToolRegistry::with_tool(Arc::new(wolfram)));
//! let agent = ConversationalAgent::new(llm, registry, ToolCallingConfig::default());
//! ```

/// Tool trait and registry.
pub mod registry;
/// Wolfram Alpha Full Results API tool.
pub mod wolfram;

pub use registry::{Tool, ToolRegistry};
pub use wolfram::WolframAlphaTool;
