use crate::config::EngineConfig;
use crate::types::{Request, Response};
use anyhow::{anyhow, Result};
use log::debug;
use serde_json::{json, Value};
use std::future::Future;

/// A text generation backend. Futures are boxed so engines can be used as
/// trait objects; callers pin them with `Pin::from`.
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    fn execute<'a>(
        &'a self,
        request: &'a Request,
    ) -> Box<dyn Future<Output = Result<Response>> + Send + 'a>;

    /// Text of the first completion in a raw provider response.
    fn extract_content(&self, value: &Value) -> Option<String>;
}

pub trait EngineConfigProcessor {
    fn process_config(&self, config: &EngineConfig) -> Result<Value>;
}

pub struct OpenAIConfigProcessor;
impl EngineConfigProcessor for OpenAIConfigProcessor {
    fn process_config(&self, config: &EngineConfig) -> Result<Value> {
        debug!("OpenAIConfigProcessor::process_config for {}", config.name);

        let mut payload = json!({
            "model": config.parameters.get("modelName")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow!("Model not specified or not a string"))?,
            "messages": [], // filled with the actual request later
        });

        if let Some(temperature) = config.parameters.get("temperature").and_then(|v| v.as_f64()) {
            payload["temperature"] = json!(temperature);
        }

        // max_tokens caps the prompt, not the completion
        if let Some(max) = config.parameters.get("max_completion_tokens").and_then(|v| v.as_u64()) {
            payload["max_tokens"] = json!(max);
        }

        if let Some(top_p) = config.parameters.get("top_p").and_then(|v| v.as_f64()) {
            payload["top_p"] = json!(top_p);
        }

        Ok(payload)
    }
}
