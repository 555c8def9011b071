//! Stub agents and app builders shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use parking_lot::Mutex;
use sensei::{
    AppState, SenseiConfig,
    agents::{Agent, Tutor},
    api::routes::create_router,
    memory::MemoryStore,
    types::{AppError, Message, Result},
};
use std::sync::Arc;
use tokio::sync::Barrier;

/// Returns the prompt it was given and records how much history it saw.
#[derive(Default)]
pub struct EchoAgent {
    pub calls: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl Agent for EchoAgent {
    async fn produce_answer(&self, prompt: &str, history: &[Message]) -> Result<String> {
        self.calls.lock().push((prompt.to_string(), history.len()));
        Ok(prompt.to_string())
    }
}

/// Always fails like an unreachable model.
pub struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    async fn produce_answer(&self, _prompt: &str, _history: &[Message]) -> Result<String> {
        Err(AppError::LLM("connection refused".to_string()))
    }
}

/// Holds every caller until `parties` callers are inside, then echoes.
pub struct BarrierAgent {
    barrier: Barrier,
    pub history_seen: Mutex<Vec<usize>>,
}

impl BarrierAgent {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
            history_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Agent for BarrierAgent {
    async fn produce_answer(&self, prompt: &str, history: &[Message]) -> Result<String> {
        self.history_seen.lock().push(history.len());
        self.barrier.wait().await;
        Ok(prompt.to_string())
    }
}

pub fn test_state(agent: Arc<dyn Agent>, config: SenseiConfig) -> AppState {
    let memory = MemoryStore::new(config.agent.memory_key.clone(), config.agent.max_sessions);
    AppState::new(config, Tutor::new(agent, memory))
}

/// Server over a router backed by `agent`, plus the state for inspecting memory.
pub fn test_server(agent: Arc<dyn Agent>) -> (TestServer, AppState) {
    test_server_with_config(agent, SenseiConfig::default())
}

pub fn test_server_with_config(
    agent: Arc<dyn Agent>,
    config: SenseiConfig,
) -> (TestServer, AppState) {
    let state = test_state(agent, config);
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

pub fn image_part() -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
        .file_name("question.png")
        .mime_type("image/png")
}

/// A complete ask form.
pub fn ask_form(user_query: &str, meta: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part("image", image_part())
        .add_text("user_query", user_query.to_string())
        .add_text("meta", meta.to_string())
}
