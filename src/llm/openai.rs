//! OpenAI-compatible chat completions client.

use crate::llm::client::{LLMClient, LLMResponse, TokenUsage};
use crate::llm::coordinator::{ConversationMessage, MessageRole};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
}

impl OpenAIClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            api_key,
            api_base,
            model,
            temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> ChatCompletionRequest {
        let tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: messages.iter().map(to_wire_message).collect(),
            tool_choice: (!tools.is_empty()).then(|| "auto".to_string()),
            tools,
        }
    }
}

fn to_wire_message(message: &ConversationMessage) -> Value {
    match message.role {
        MessageRole::System => json!({ "role": "system", "content": message.content }),
        MessageRole::User => json!({ "role": "user", "content": message.content }),
        MessageRole::Assistant if message.tool_calls.is_empty() => {
            json!({ "role": "assistant", "content": message.content })
        }
        MessageRole::Assistant => {
            let tool_calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            // The API expects arguments as a JSON-encoded string
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let content = (!message.content.is_empty()).then(|| message.content.clone());
            json!({ "role": "assistant", "content": content, "tool_calls": tool_calls })
        }
        MessageRole::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id.clone().unwrap_or_default(),
            "content": message.content,
        }),
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let request = self.build_request(messages, tools);

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(match status.as_u16() {
                401 => AppError::LLM(format!("OpenAI authentication failed: {}", reason)),
                429 => AppError::LLM(format!("OpenAI rate limit exceeded: {}", reason)),
                _ => AppError::LLM(format!("OpenAI API error ({}): {}", status, reason)),
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid OpenAI response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: serde_json::from_str(&call.function.arguments)
                    .unwrap_or(json!({})),
            })
            .collect();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            usage: body
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============= Wire Types =============

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAIClient {
        OpenAIClient::new(
            reqwest::Client::new(),
            "sk-test".to_string(),
            "https://api.example.com/v1/".to_string(),
            "gpt-test".to_string(),
            0.0,
        )
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            client().completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_without_tools_omits_tool_fields() {
        let request = client().build_request(&[ConversationMessage::user("hi")], &[]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"], json!([{ "role": "user", "content": "hi" }]));
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_request_with_tools() {
        let tools = vec![ToolDefinition {
            name: "wolfram_alpha".to_string(),
            description: "math".to_string(),
            parameters: json!({ "type": "object" }),
        }];
        let request = client().build_request(&[ConversationMessage::user("hi")], &tools);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "wolfram_alpha");
    }

    #[test]
    fn test_tool_round_trip_messages() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "wolfram_alpha".to_string(),
            arguments: json!({ "query": "2+2" }),
        };
        let assistant = to_wire_message(&ConversationMessage::assistant("", vec![call]));
        assert_eq!(assistant["content"], Value::Null);
        assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
        let encoded = assistant["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .unwrap();
        let args: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(args["query"], "2+2");

        let result = json!({ "result": "4" });
        let tool = to_wire_message(&ConversationMessage::tool_result("call_1", &result));
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_1");
        assert!(tool["content"].as_str().unwrap().contains('4'));
    }
}
