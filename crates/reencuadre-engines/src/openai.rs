use anyhow::{Context, Result};
use log::debug;
use reencuadre_core::config::EngineConfig;
use reencuadre_core::error::UpstreamError;
use reencuadre_core::redaction::redact_secrets_in_text;
use reencuadre_core::traits::{Engine, EngineConfigProcessor, OpenAIConfigProcessor};
use reencuadre_core::types::{Request, Response, Usage};
use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;

use crate::{token_count, NO_RESPONSE};

pub struct OpenAIEngine {
    config: EngineConfig,
    config_processor: OpenAIConfigProcessor,
    client: Client,
}

impl OpenAIEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.bearer_token()?;
        Ok(Self {
            config,
            config_processor: OpenAIConfigProcessor,
            client: Client::new(),
        })
    }

    /// Chat completion payload with the prompt as the single user message.
    pub fn build_payload(&self, prompt: &str) -> Result<Value> {
        let mut payload = self.config_processor.process_config(&self.config)?;
        payload["messages"] = json!([
            {
                "role": "user",
                "content": self.config.cap_prompt(prompt.to_string())
            }
        ]);
        Ok(payload)
    }

    pub fn parse_response(&self, body: &Value) -> Response {
        let content = self
            .extract_content(body)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string());

        Response {
            content,
            usage: Usage {
                prompt_tokens: token_count(&body["usage"]["prompt_tokens"]),
                completion_tokens: token_count(&body["usage"]["completion_tokens"]),
                total_tokens: token_count(&body["usage"]["total_tokens"]),
            },
            model: body["model"].as_str().unwrap_or("unknown").to_string(),
            finish_reason: body["choices"][0]["finish_reason"]
                .as_str()
                .map(String::from),
        }
    }
}

impl Engine for OpenAIEngine {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn extract_content(&self, value: &Value) -> Option<String> {
        value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(String::from)
    }

    fn execute<'a>(
        &'a self,
        request: &'a Request,
    ) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
        Box::new(async move {
            let payload = self.build_payload(&request.payload)?;
            debug!("OpenAI payload model: {}", payload["model"]);

            let url = self.config.connection.url();
            debug!("OpenAI request to {}", redact_secrets_in_text(&url));

            let res = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.config.bearer_token()?))
                .header("Content-Type", "application/json")
                .json(&payload)
                .send()
                .await
                .context("Failed to reach OpenAI")?;

            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                debug!("OpenAI error response {}: {}", status, body);
                return Err(UpstreamError {
                    engine: self.name().to_string(),
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            let response_body = res
                .json::<Value>()
                .await
                .context("OpenAI response is not valid JSON")?;
            debug!("OpenAI response: {:?}", response_body);

            Ok(self.parse_response(&response_body))
        })
    }
}
