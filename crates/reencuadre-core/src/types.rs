// crates/reencuadre-core/src/types.rs
use crate::composer::ComposedResult;
use crate::render::RenderTree;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Request {
    pub flowname: String,
    pub payload: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Response {
    pub content: String,
    pub usage: Usage,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Body accepted by the generation function: either a ready prompt or the
/// structured fields the prompt is built from on the server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GenerationRequest {
    Prompt { prompt: String },
    Structured(StructuredRequest),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct StructuredRequest {
    pub problema: String,
    #[serde(default)]
    pub criticidad: Option<Value>,
    #[serde(default)]
    pub frecuencia: Option<String>,
    #[serde(default)]
    pub tiempo: Option<String>,
    #[serde(default)]
    pub emociones: Vec<String>,
    #[serde(default)]
    pub idioma: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub respuesta: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub error: String,
}

/// What one generation produced. Model text is kept opaque.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GeneratedOutput {
    Composed(ComposedResult),
    FreeText(String),
}

impl GeneratedOutput {
    pub fn render(&self) -> RenderTree {
        match self {
            GeneratedOutput::Composed(result) => RenderTree::from_composed(result),
            GeneratedOutput::FreeText(text) => RenderTree::opaque(text),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            GeneratedOutput::Composed(result) => result.to_text(),
            GeneratedOutput::FreeText(text) => text.clone(),
        }
    }
}
