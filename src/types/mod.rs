use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Multipart form accepted by `POST /api/v1/ask`.
///
/// Only used to describe the endpoint in the OpenAPI document; the handler
/// reads the fields straight off the multipart stream.
#[derive(Debug, ToSchema)]
pub struct AskForm {
    /// Uploaded image. Accepted and read, never sent to the agent.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// The student's question.
    pub user_query: String,
    /// JSON object, e.g. `{"context": "doubt", "session_id": "abc"}`.
    pub meta: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub status: String,
    pub message: String,
}

impl AskResponse {
    pub fn success(message: String) -> Self {
        Self {
            status: "success".to_string(),
            message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestResponse {
    #[serde(rename = "Message")]
    pub message: String,
}

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

// ============= Question Metadata =============

/// Which prompt template a question is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionContext {
    /// Step-by-step detailed solution.
    #[default]
    General,
    /// Short, beginner friendly answer to a doubt.
    Doubt,
}

impl QuestionContext {
    /// The flag as the client sends it; the general context is the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionContext::General => "",
            QuestionContext::Doubt => "doubt",
        }
    }

    pub fn from_flag(flag: &str) -> Self {
        if flag == "doubt" {
            QuestionContext::Doubt
        } else {
            QuestionContext::General
        }
    }
}

/// Metadata sent alongside a question in the `meta` form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskMeta {
    pub context: QuestionContext,
    pub session_id: Option<String>,
}

impl AskMeta {
    /// Parse the raw `meta` field.
    ///
    /// Invalid JSON is an error. Valid JSON that is not an object, or whose
    /// `context` is anything but the string `"doubt"`, yields the general
    /// context. Unknown keys are ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::MalformedMetadata(e.to_string()))?;

        let Some(object) = value.as_object() else {
            return Ok(Self::default());
        };

        let context = object
            .get("context")
            .and_then(|v| v.as_str())
            .map(QuestionContext::from_flag)
            .unwrap_or_default();

        let session_id = object
            .get("session_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Self {
            context,
            session_id,
        })
    }
}

// ============= Conversation Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedMetadata(_) => "MALFORMED_METADATA",
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::LLM(_) | AppError::Tool(_) => "UPSTREAM_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::MalformedMetadata(_) => StatusCode::BAD_REQUEST,
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::LLM(_) | AppError::Tool(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), "{}", self);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            code: self.code().to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
