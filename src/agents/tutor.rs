//! Math tutor: prompt templating in front of the agent.
//!
//! [`Tutor::initialize`] builds the single agent the process uses. Each
//! [`Tutor::answer`] renders the question into one of the two templates,
//! hands it to the agent together with the caller's conversation memory, and
//! records the exchange in that memory.

use crate::agents::{Agent, ConversationalAgent};
use crate::llm::{LLMClient, OpenAIClient, ToolCallingConfig};
use crate::memory::{ConversationMemory, MemoryStore};
use crate::prompts;
use crate::tools::{ToolRegistry, WolframAlphaTool};
use crate::types::{AppError, QuestionContext, Result};
use crate::utils::config::{Secrets, SenseiConfig};
use std::sync::Arc;
use std::time::Duration;

pub struct Tutor {
    agent: Arc<dyn Agent>,
    memory: MemoryStore,
}

impl Tutor {
    pub fn new(agent: Arc<dyn Agent>, memory: MemoryStore) -> Self {
        Self { agent, memory }
    }

    /// Build the production tutor: an OpenAI-compatible model at the
    /// configured temperature, with Wolfram Alpha as its only tool.
    ///
    /// Fails when either credential is missing from the environment.
    pub fn initialize(config: &SenseiConfig) -> Result<Self> {
        let secrets = config.resolve_secrets()?;
        Self::initialize_with_secrets(config, &secrets)
    }

    pub fn initialize_with_secrets(config: &SenseiConfig, secrets: &Secrets) -> Result<Self> {
        tracing::info!("Initializing tutor agent");
        let http = reqwest::Client::builder()
            .timeout(config.llm.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let llm: Arc<dyn LLMClient> = Arc::new(OpenAIClient::new(
            http.clone(),
            secrets.llm_api_key.clone(),
            config.llm.api_base.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
        ));
        tracing::info!(
            model = llm.model_name(),
            temperature = config.llm.temperature,
            "LLM client ready"
        );

        tracing::info!("Initializing Wolfram Alpha tool");
        let wolfram = WolframAlphaTool::new(
            http,
            config.wolfram.api_base.clone(),
            secrets.wolfram_app_id.clone(),
        );
        let registry = Arc::new(ToolRegistry::with_tool(Arc::new(wolfram)));
        tracing::info!(tools = ?registry.tool_names(), "Tools registered");

        let tool_config = ToolCallingConfig {
            max_iterations: config.agent.max_tool_iterations,
            parallel_execution: config.agent.parallel_tool_calls,
            tool_timeout: Duration::from_secs(config.agent.tool_timeout_secs),
            stop_on_error: config.agent.stop_on_tool_error,
        };
        let mut agent = ConversationalAgent::new(llm, registry, tool_config);
        if let Some(system_prompt) = &config.agent.system_prompt {
            agent = agent.with_system_prompt(system_prompt.clone());
        }

        Ok(Self::new(
            Arc::new(agent),
            MemoryStore::new(config.agent.memory_key.clone(), config.agent.max_sessions),
        ))
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Answer a question in the given context, using and extending `memory`.
    ///
    /// The answer is returned exactly as the agent produced it. Nothing is
    /// recorded when the agent fails.
    pub async fn answer(
        &self,
        question: &str,
        context: QuestionContext,
        memory: &ConversationMemory,
    ) -> Result<String> {
        let prompt = prompts::render(context, question);
        let history = memory.load();

        tracing::debug!(
            memory_key = memory.key(),
            history_len = history.len(),
            context = context.as_str(),
            "Invoking agent"
        );

        let answer = self.agent.produce_answer(&prompt, &history).await?;
        memory.save_exchange(&prompt, &answer);
        Ok(answer)
    }
}
