use anyhow::{anyhow, Context, Result};
use log::debug;
use reencuadre_core::config::EngineConfig;
use reencuadre_core::error::UpstreamError;
use reencuadre_core::redaction::redact_secrets_in_text;
use reencuadre_core::traits::Engine;
use reencuadre_core::types::{Request, Response, Usage};
use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;

use crate::{token_count, NO_RESPONSE};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GoogleGeminiEngine {
    config: EngineConfig,
    client: Client,
}

impl GoogleGeminiEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.bearer_token()?;
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    fn model(&self) -> &str {
        self.config.parameter_str("modelName").unwrap_or(DEFAULT_MODEL)
    }

    /// Connection URL with `{modelName}` filled in. The key travels in a
    /// header, never in the query string.
    pub fn endpoint(&self) -> String {
        self.config.connection.url().replace("{modelName}", self.model())
    }

    pub fn build_payload(&self, prompt: &str) -> Value {
        let params = &self.config.parameters;
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": self.config.cap_prompt(prompt.to_string()) }]
            }],
            "generationConfig": {
                "temperature": params.get("temperature").and_then(|v| v.as_f64()).unwrap_or(0.7),
                "topK": params.get("top_k").and_then(|v| v.as_u64()).unwrap_or(40),
                "topP": params.get("top_p").and_then(|v| v.as_f64()).unwrap_or(0.95),
                "maxOutputTokens": params.get("max_completion_tokens").and_then(|v| v.as_u64()).unwrap_or(2048),
            }
        })
    }

    pub fn parse_response(&self, body: &Value) -> Response {
        let content = self
            .extract_content(body)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string());

        Response {
            content,
            usage: Usage {
                prompt_tokens: token_count(&body["usageMetadata"]["promptTokenCount"]),
                completion_tokens: token_count(&body["usageMetadata"]["candidatesTokenCount"]),
                total_tokens: token_count(&body["usageMetadata"]["totalTokenCount"]),
            },
            model: self.model().to_string(),
            finish_reason: body["candidates"][0]["finishReason"]
                .as_str()
                .map(String::from),
        }
    }
}

impl Engine for GoogleGeminiEngine {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn extract_content(&self, value: &Value) -> Option<String> {
        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(String::from)
    }

    fn execute<'a>(
        &'a self,
        request: &'a Request,
    ) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
        Box::new(async move {
            let url = self.endpoint();
            let request_body = self.build_payload(&request.payload);
            debug!("Gemini request to {}", redact_secrets_in_text(&url));

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", self.config.bearer_token()?)
                .header("Content-Type", "application/json")
                .json(&request_body)
                .send()
                .await
                .context("Failed to reach Gemini")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!("Gemini error response {}: {}", status, body);
                return Err(UpstreamError {
                    engine: self.name().to_string(),
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            let response_body: Value = response
                .json()
                .await
                .context("Gemini response is not valid JSON")?;
            debug!("Gemini response: {:?}", response_body);

            if let Some(reason) = response_body["promptFeedback"]["blockReason"].as_str() {
                return Err(anyhow!("Gemini blocked the prompt: {}", reason));
            }

            Ok(self.parse_response(&response_body))
        })
    }
}
