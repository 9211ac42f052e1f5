// crates/reencuadre-engines/src/lib.rs
pub mod google_gemini;
pub mod openai;

use anyhow::{anyhow, Result};
use log::debug;
use reencuadre_core::config::EngineConfig;
use reencuadre_core::traits::Engine;
use std::str::FromStr;
use strum::{Display, EnumString};

use google_gemini::GoogleGeminiEngine;
use openai::OpenAIEngine;

/// Text returned when the provider answered without any content.
pub const NO_RESPONSE: &str = "No hay respuesta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum EngineType {
    #[strum(ascii_case_insensitive, to_string = "openai")]
    OpenAI,

    #[strum(
        ascii_case_insensitive,
        serialize = "gemini",
        to_string = "google_gemini"
    )]
    GoogleGemini,
}

pub fn create_engine(engine_config: &EngineConfig) -> Result<Box<dyn Engine>> {
    let engine_type = EngineType::from_str(&engine_config.engine)
        .map_err(|_| anyhow!("Unknown engine type: {}", engine_config.engine))?;
    debug!("Creating {} engine '{}'", engine_type, engine_config.name);

    match engine_type {
        EngineType::OpenAI => Ok(Box::new(OpenAIEngine::new(engine_config.clone())?)),
        EngineType::GoogleGemini => Ok(Box::new(GoogleGeminiEngine::new(engine_config.clone())?)),
    }
}

/// Usage counters are optional in provider answers.
pub(crate) fn token_count(value: &serde_json::Value) -> u32 {
    value.as_u64().unwrap_or(0) as u32
}
