use anyhow::Result;
use reencuadre_core::config::load_engine_config;
use reencuadre_core::error::UpstreamError;
use reencuadre_core::session::FLOW_NAME;
use reencuadre_core::traits::Engine;
use reencuadre_core::types::{GenerationFailure, GenerationReply, GenerationRequest, Request};
use reencuadre_engines::create_engine;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, pin::Pin, sync::Arc};

/// Selects the engine entry of the embedded config.
pub const ENGINE_ENV: &str = "REENCUADRE_ENGINE";
pub const DEFAULT_ENGINE: &str = "openai";

/// Invocation payload: the HTTP body as received by the function.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FunctionEvent {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string()),
        }
    }

    pub fn reply(respuesta: String) -> Self {
        Self::json(200, &GenerationReply { respuesta })
    }

    pub fn failure(status_code: u16, error: String) -> Self {
        Self::json(status_code, &GenerationFailure { error })
    }
}

/// Builds the prompt from the request body and relays it to one engine.
pub struct Relay {
    engine: Arc<dyn Engine>,
}

impl Relay {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub fn from_env() -> Result<Self> {
        let engine_name = env::var(ENGINE_ENV).unwrap_or_else(|_| DEFAULT_ENGINE.to_string());
        let config_content = include_str!("config.json");
        let engine_config = load_engine_config(config_content, &engine_name, &HashMap::new())?;
        Ok(Self::new(Arc::from(create_engine(&engine_config)?)))
    }

    pub async fn handle(&self, event: FunctionEvent) -> FunctionResponse {
        let Some(body) = event.body.filter(|b| !b.trim().is_empty()) else {
            return FunctionResponse::failure(400, "Request body is required".to_string());
        };
        let request: GenerationRequest = match serde_json::from_str(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Rejecting malformed body: {}", e);
                return FunctionResponse::failure(400, format!("Invalid request body: {}", e));
            }
        };

        let request = Request {
            flowname: FLOW_NAME.to_string(),
            payload: request.into_prompt(),
        };

        match Pin::from(self.engine.execute(&request)).await {
            Ok(response) => FunctionResponse::reply(response.content),
            Err(e) => match e.downcast_ref::<UpstreamError>() {
                Some(upstream) => {
                    tracing::warn!("{} answered {}", upstream.engine, upstream.status);
                    FunctionResponse::failure(upstream.status, upstream.to_string())
                }
                None => {
                    tracing::error!("Generation failed: {:#}", e);
                    FunctionResponse::failure(500, e.to_string())
                }
            },
        }
    }
}

pub async fn run(event: FunctionEvent) -> FunctionResponse {
    match Relay::from_env() {
        Ok(relay) => relay.handle(event).await,
        Err(e) => {
            tracing::error!("Engine setup failed: {:#}", e);
            FunctionResponse::failure(500, e.to_string())
        }
    }
}
