use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::HashMap;
use std::sync::Arc;
use std::{env, fs};

pub const TRUNCATION_SUFFIX: &str = "... [truncated]";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    pub name: String,
    pub engine: String,
    pub connection: ConnectionConfig,
    pub parameters: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConnectionConfig {
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
    pub request_path: String,
}

impl ConnectionConfig {
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol, self.hostname, self.port, self.request_path
        )
    }
}

impl EngineConfig {
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }

    pub fn bearer_token(&self) -> Result<&str> {
        self.parameter_str("bearer_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Bearer token not found in configuration"))
    }

    /// Truncates the prompt to the `max_tokens` parameter, counted in
    /// characters, appending [`TRUNCATION_SUFFIX`].
    pub fn cap_prompt(&self, prompt: String) -> String {
        let Some(max) = self
            .parameters
            .get("max_tokens")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
        else {
            return prompt;
        };
        match prompt.char_indices().nth(max) {
            Some((cut, _)) => {
                let mut capped = prompt[..cut].to_string();
                capped.push_str(TRUNCATION_SUFFIX);
                capped
            }
            None => prompt,
        }
    }
}

pub trait VariableResolver {
    fn is_resolvable(&self, key: &str) -> bool;
    fn resolve(&self, key: &str) -> Result<String>;
}

pub struct EnvVarResolver {}

/// Loads one engine from a JSON config of the form
/// `{"engines": [{"name", "engine", "connection", "parameters"}]}`.
///
/// String values starting with `ENV_` (or written `${VAR}`) are read from the
/// environment. Override keys may be dotted to reach nested parameters.
pub fn load_engine_config(
    config_content: &str,
    engine_name: &str,
    overrides: &HashMap<String, Value>,
) -> Result<EngineConfig> {
    let mut config: Value =
        serde_json::from_str(config_content).context("Engine configuration is not valid JSON")?;

    debug!("Loading config for engine: {}", engine_name);

    let engine_config = config["engines"]
        .as_array_mut()
        .ok_or_else(|| anyhow!("No engines found in configuration"))?
        .iter_mut()
        .find(|e| e["name"].as_str() == Some(engine_name))
        .ok_or_else(|| anyhow!("Engine '{}' not found in configuration", engine_name))?;

    apply_variable_resolver(engine_config)?;
    apply_variable_overrider(engine_config, overrides)?;

    debug!("Loaded and processed config for engine: {}", engine_name);

    serde_json::from_value(engine_config.clone()).context("Could not parse engine config")
}

/// Reads the engine config from a file, converting `key=value` CLI
/// overrides into JSON booleans, numbers or strings.
pub fn load_engine_config_file(
    config_path: &str,
    engine_name: &str,
    overrides: &HashMap<String, String>,
) -> Result<EngineConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Could not read engine configuration '{}'", config_path))?;
    load_engine_config(&content, engine_name, &typed_overrides(overrides))
}

fn typed_overrides(overrides: &HashMap<String, String>) -> HashMap<String, Value> {
    overrides
        .iter()
        .map(|(k, v)| (k.clone(), override_value(v)))
        .collect()
}

fn override_value(v: &str) -> Value {
    if let Ok(b) = v.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = v.parse::<i64>() {
        return Value::from(i);
    }
    match v.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Some(num) => Value::Number(num),
        None => Value::String(v.to_string()),
    }
}

fn apply_variable_resolver(engine_config: &mut Value) -> Result<()> {
    let mut processor = VariableResolverProcessor::default();
    processor.resolve(engine_config)?;
    Ok(())
}

fn apply_variable_overrider(
    engine_config: &mut Value,
    overrides: &HashMap<String, Value>,
) -> Result<()> {
    if let Some(parameters) = engine_config
        .get_mut("parameters")
        .and_then(Value::as_object_mut)
    {
        for (key, value) in overrides {
            let mut keys = key.split('.').peekable();
            let mut current = &mut *parameters;
            while let Some(part) = keys.next() {
                if keys.peek().is_none() {
                    current.insert(part.to_string(), value.clone());
                } else {
                    current = current
                        .entry(part)
                        .or_insert_with(|| Value::Object(serde_json::Map::new()))
                        .as_object_mut()
                        .ok_or_else(|| anyhow!("Override '{}' crosses a non-object value", key))?;
                }
            }
        }
    }
    Ok(())
}

impl VariableResolver for EnvVarResolver {
    fn is_resolvable(&self, key: &str) -> bool {
        key.starts_with("ENV_") || (key.starts_with("${") && key.ends_with('}'))
    }
    fn resolve(&self, key: &str) -> Result<String> {
        let env_key = if let Some(stripped) = key.strip_prefix("ENV_") {
            stripped
        } else if let Some(inner) = key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
            inner
        } else {
            return Err(anyhow!("Invalid environment variable format: {}", key));
        };

        debug!("Looking up environment variable: {}", env_key);
        env::var(env_key).map_err(|e| {
            debug!("Failed to find environment variable '{}': {}", env_key, e);
            anyhow!("Failed to find environment variable '{}': {}", env_key, e)
        })
    }
}

pub fn parse_key_value_pair(pair: &str) -> Option<(String, String)> {
    pair.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
}

pub struct VariableResolverProcessor {
    resolvers: Vec<Arc<dyn VariableResolver>>,
}

impl Default for VariableResolverProcessor {
    fn default() -> Self {
        VariableResolverProcessor {
            resolvers: vec![Arc::new(EnvVarResolver {})],
        }
    }
}

impl VariableResolverProcessor {
    fn resolve(&mut self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => {
                for resolver in &self.resolvers {
                    if resolver.is_resolvable(s) {
                        *s = resolver.resolve(s)?;
                        return Ok(());
                    }
                }
                Ok(())
            }
            Value::Object(map) => {
                for (_, v) in map.iter_mut() {
                    self.resolve(v)?;
                }
                Ok(())
            }
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    self.resolve(item)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
