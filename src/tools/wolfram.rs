//! Wolfram Alpha tool
//!
//! Queries the Wolfram Alpha Full Results API and condenses the pods into a
//! short "assumption + answer" string the model can quote.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

pub const DEFAULT_WOLFRAM_API_BASE: &str = "https://api.wolframalpha.com";

const NO_ANSWER: &str = "Wolfram Alpha wasn't able to answer it";
const NO_GOOD_RESULT: &str = "No good Wolfram Alpha Result was found";

pub struct WolframAlphaTool {
    client: reqwest::Client,
    api_base: String,
    app_id: String,
}

impl WolframAlphaTool {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            app_id: app_id.into(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/v2/query", self.api_base.trim_end_matches('/'))
    }

    /// Run a query and format the answer.
    pub async fn run(&self, query: &str) -> Result<String> {
        tracing::debug!(query_len = query.len(), "Querying Wolfram Alpha");

        let response = self
            .client
            .get(self.query_url())
            .query(&[
                ("appid", self.app_id.as_str()),
                ("input", query),
                ("output", "json"),
                ("format", "plaintext"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Wolfram Alpha request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Tool(format!(
                "Wolfram Alpha returned status {}",
                status
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Invalid Wolfram Alpha response: {}", e)))?;

        format_result(body.queryresult)
    }
}

#[async_trait]
impl Tool for WolframAlphaTool {
    fn name(&self) -> &str {
        "wolfram_alpha"
    }

    fn description(&self) -> &str {
        "A wrapper around Wolfram Alpha. Useful for when you need to answer questions about \
         Math, Science, Technology, Culture, Society and Everyday Life. \
         Input should be a search query."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to send to Wolfram Alpha, e.g. 'integrate x^2 dx'"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'query' parameter".to_string()))?;

        let answer = self.run(query).await?;
        Ok(json!({ "result": answer }))
    }
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct QueryResponse {
    queryresult: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    success: bool,
    /// `false` on success, an object with `msg` on API errors.
    #[serde(default)]
    error: Value,
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    title: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    subpods: Vec<Subpod>,
}

#[derive(Debug, Deserialize)]
struct Subpod {
    #[serde(default)]
    plaintext: Option<String>,
}

impl Pod {
    /// Pods that carry the answer: the primary one, or one titled `Result`.
    fn is_result(&self) -> bool {
        self.primary || self.title == "Result"
    }

    fn text(&self) -> Option<&str> {
        self.subpods.first().and_then(|s| s.plaintext.as_deref())
    }
}

fn format_result(result: QueryResult) -> Result<String> {
    if let Some(error) = result.error.as_object() {
        let msg = error
            .get("msg")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(AppError::Tool(format!("Wolfram Alpha error: {}", msg)));
    }

    if !result.success {
        return Ok(NO_ANSWER.to_string());
    }

    let Some(assumption) = result.pods.first() else {
        return Ok(NO_ANSWER.to_string());
    };
    let Some(answer_pod) = result.pods.iter().find(|p| p.is_result()) else {
        return Ok(NO_ANSWER.to_string());
    };

    match answer_pod.text() {
        Some(answer) if !answer.is_empty() => Ok(format!(
            "Assumption: {} \nAnswer: {}",
            assumption.text().unwrap_or_default(),
            answer
        )),
        _ => Ok(NO_GOOD_RESULT.to_string()),
    }
}
