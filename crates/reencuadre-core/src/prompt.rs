//! Instruction prompts for the model-backed variants.

use crate::input::{load_label, SessionInput};
use crate::types::{GenerationRequest, StructuredRequest};
use serde_json::Value;

/// Section structure the model is asked to follow.
pub const RESPONSE_SECTIONS: [&str; 5] = [
    "Reencuadre por Marcos",
    "Reto de la Responsabilidad Estoica",
    "Reencuadre de Submodalidades",
    "Especificaciones de Desarrollo",
    "Checklist de Cumplimiento",
];

pub const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_CRITICALITY: &str = "media";
pub const DEFAULT_FREQUENCY: &str = "diaria";
pub const DEFAULT_TIMEFRAME: &str = "indefinido";

/// Prompt built on the client from a validated session.
pub fn build_instruction_prompt(input: &SessionInput) -> String {
    let params = input.submodality_params.format();
    let sections = RESPONSE_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, s)| format!("- Sección {}: {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Actúa como el motor lógico de una aplicación de Coaching Terapéutico PNL/Estoico.\n\
Tu tarea es aplicar un proceso de reencuadre terapéutico a la situación proporcionada.\n\
Datos de Entrada:\n\
- Situación: {}\n\
- Emociones: {}\n\
- Emoción Principal: {}\n\
- Carga Emocional: {} ({})\n\
- Objeto Representativo: {}\n\
- Tiempo: {}\n\
- Frecuencia: {}\n\
- Parámetros de Debilitamiento: {}\n\
\n\
Estructura de Respuesta:\n\
{}\n",
        input.situation_text,
        input.emotions_joined(),
        input.primary_emotion(),
        input.emotional_load,
        load_label(input.emotional_load),
        input.representative_object,
        input.timeframe,
        input.frequency,
        if params.is_empty() { "Ninguno" } else { params.as_str() },
        sections
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prompt built on the server from the structured request fields.
pub fn build_structured_prompt(request: &StructuredRequest) -> String {
    format!(
        "Idioma: {}\n\
Problema: {}\n\
Criticidad: {}\n\
Frecuencia: {}\n\
Tiempo: {}\n\
Emociones: {}\n\
\n\
Aplica los marcos de reencuadre terapéutico y devuelve la respuesta detallada.\n",
        request.idioma.as_deref().unwrap_or(DEFAULT_LANGUAGE),
        request.problema,
        request
            .criticidad
            .as_ref()
            .filter(|v| !v.is_null())
            .map(value_text)
            .unwrap_or_else(|| DEFAULT_CRITICALITY.to_string()),
        request.frecuencia.as_deref().unwrap_or(DEFAULT_FREQUENCY),
        request.tiempo.as_deref().unwrap_or(DEFAULT_TIMEFRAME),
        request.emociones.join(", "),
    )
}

impl GenerationRequest {
    pub fn into_prompt(self) -> String {
        match self {
            GenerationRequest::Prompt { prompt } => prompt,
            GenerationRequest::Structured(request) => build_structured_prompt(&request),
        }
    }
}
