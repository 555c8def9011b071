//! TOML-based configuration for Sensei
//!
//! Settings come from an optional TOML file (`sensei.toml`); every field has a
//! default, so a missing file is the same as an empty one. Credentials are not
//! stored in the file: it names the environment variables that hold them, and
//! [`SenseiConfig::resolve_secrets`] reads those at startup.

use crate::llm::openai::DEFAULT_OPENAI_API_BASE;
use crate::memory::{DEFAULT_MAX_SESSIONS, DEFAULT_MEMORY_KEY};
use crate::tools::wolfram::DEFAULT_WOLFRAM_API_BASE;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from sensei.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenseiConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub wolfram: WolframConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted request body, image included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; 0 returns the most probable answer
    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable containing the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

fn default_llm_api_base() -> String {
    DEFAULT_OPENAI_API_BASE.to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_model(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout_secs(),
            api_key_env: default_llm_api_key_env(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Wolfram Alpha Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WolframConfig {
    #[serde(default = "default_wolfram_api_base")]
    pub api_base: String,

    /// Environment variable containing the Wolfram Alpha application id
    #[serde(default = "default_app_id_env")]
    pub app_id_env: String,
}

fn default_wolfram_api_base() -> String {
    DEFAULT_WOLFRAM_API_BASE.to_string()
}

fn default_app_id_env() -> String {
    "WOLFRAM_ALPHA_APPID".to_string()
}

impl Default for WolframConfig {
    fn default() -> Self {
        Self {
            api_base: default_wolfram_api_base(),
            app_id_env: default_app_id_env(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Run the tool calls of one model turn concurrently
    #[serde(default = "default_true")]
    pub parallel_tool_calls: bool,

    /// Fail the request on the first tool error instead of reporting the
    /// error back to the model
    #[serde(default)]
    pub stop_on_tool_error: bool,

    /// Replaces the built-in agent system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Key of the memory shared by callers without a session
    #[serde(default = "default_memory_key")]
    pub memory_key: String,

    /// Session memories kept at once; the least recently used is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_tool_iterations() -> usize {
    10
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_memory_key() -> String {
    DEFAULT_MEMORY_KEY.to_string()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            tool_timeout_secs: default_tool_timeout_secs(),
            parallel_tool_calls: true,
            stop_on_tool_error: false,
            system_prompt: None,
            memory_key: default_memory_key(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ============= Configuration Loading =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was missing; defaults were used.
    Defaults(PathBuf),
}

/// Credentials read from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub llm_api_key: String,
    pub wolfram_app_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("llm_api_key", &"<redacted>")
            .field("wolfram_app_id", &"<redacted>")
            .finish()
    }
}

impl SenseiConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_source(path).map(|(config, _)| config)
    }

    /// Same as [`load`](Self::load), also reporting where the values came
    /// from. Nothing is logged here since this runs before tracing is set up.
    pub fn load_with_source<P: AsRef<Path>>(
        path: P,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults(path.to_path_buf())));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&content)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SenseiConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_iterations must be at least 1".to_string(),
            ));
        }
        if self.agent.memory_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "agent.memory_key must not be empty".to_string(),
            ));
        }
        if self.agent.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_sessions must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    /// Read the credentials named by the configuration from the process environment.
    pub fn resolve_secrets(&self) -> Result<Secrets, ConfigError> {
        self.resolve_secrets_with(|name| std::env::var(name).ok())
    }

    /// Same as [`resolve_secrets`](Self::resolve_secrets) with a custom lookup.
    /// Empty values count as missing.
    pub fn resolve_secrets_with<F>(&self, lookup: F) -> Result<Secrets, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        Ok(Secrets {
            llm_api_key: require(&self.llm.api_key_env)?,
            wolfram_app_id: require(&self.wolfram.app_id_env)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SenseiConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.wolfram.app_id_env, "WOLFRAM_ALPHA_APPID");
        assert_eq!(config.agent.memory_key, "chat_history");
        assert_eq!(config.agent.max_sessions, 1024);
        assert!(config.agent.parallel_tool_calls);
        assert!(!config.agent.stop_on_tool_error);
        assert!(config.agent.system_prompt.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SenseiConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [llm]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.agent.max_tool_iterations, 10);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SenseiConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_iterations() {
        let result = SenseiConfig::from_toml_str("[agent]\nmax_tool_iterations = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_sessions() {
        let result = SenseiConfig::from_toml_str("[agent]\nmax_sessions = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_agent_knobs_from_toml() {
        let config = SenseiConfig::from_toml_str(
            r#"
            [agent]
            parallel_tool_calls = false
            stop_on_tool_error = true
            system_prompt = "Only use tools for arithmetic."
            max_sessions = 16
            "#,
        )
        .unwrap();

        assert!(!config.agent.parallel_tool_calls);
        assert!(config.agent.stop_on_tool_error);
        assert_eq!(
            config.agent.system_prompt.as_deref(),
            Some("Only use tools for arithmetic.")
        );
        assert_eq!(config.agent.max_sessions, 16);
        assert_eq!(config.agent.memory_key, "chat_history");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SenseiConfig::load(dir.path().join("sensei.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[wolfram]\napi_base = \"http://localhost:9999\"").unwrap();

        let config = SenseiConfig::load(file.path()).unwrap();
        assert_eq!(config.wolfram.api_base, "http://localhost:9999");
    }

    #[test]
    fn test_load_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sensei.toml");
        let (_, source) = SenseiConfig::load_with_source(&missing).unwrap();
        assert_eq!(source, ConfigSource::Defaults(missing));

        let present = dir.path().join("present.toml");
        std::fs::write(&present, "[server]\nport = 9001\n").unwrap();
        let (config, source) = SenseiConfig::load_with_source(&present).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(source, ConfigSource::File(present));
    }

    #[test]
    fn test_resolve_secrets() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("WOLFRAM_ALPHA_APPID", "APP-123"),
        ]
        .into_iter()
        .collect();

        let secrets = SenseiConfig::default()
            .resolve_secrets_with(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(secrets.llm_api_key, "sk-test");
        assert_eq!(secrets.wolfram_app_id, "APP-123");
        assert!(!format!("{:?}", secrets).contains("sk-test"));
    }

    #[test]
    fn test_missing_wolfram_app_id_is_fatal() {
        let result = SenseiConfig::default().resolve_secrets_with(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });

        match result {
            Err(ConfigError::MissingEnvVar(name)) => assert_eq!(name, "WOLFRAM_ALPHA_APPID"),
            other => panic!("expected missing env var, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let result = SenseiConfig::default().resolve_secrets_with(|_| Some("  ".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar(name)) if name == "OPENAI_API_KEY"
        ));
    }

    #[test]
    fn test_config_error_converts_to_app_error() {
        let err: AppError = ConfigError::MissingEnvVar("X".to_string()).into();
        assert!(matches!(err, AppError::Config(_)));
    }
}
