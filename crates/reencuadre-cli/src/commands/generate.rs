use anyhow::{Context, Result};
use log::{debug, warn};
use reencuadre_core::catalog::{is_known_emotion, CUSTOM_OBJECT, PREDEFINED_OBJECTS};
use reencuadre_core::config::{load_engine_config_file, parse_key_value_pair};
use reencuadre_core::input::{SessionDraft, SubmodalityKind};
use reencuadre_core::session::{Generation, Generator, ReframeSession};
use reencuadre_engines::create_engine;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::{CliContext, CommandHandler};
use crate::args::{GenerateArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{render_tree, to_json};

pub struct GenerateCommand {
    args: GenerateArgs,
}

impl GenerateCommand {
    pub fn new(args: GenerateArgs) -> Self {
        Self { args }
    }

    /// Fills the form state from the flags. Missing values are left for
    /// [`SessionDraft::validate`] to report.
    pub fn draft(&self) -> Result<SessionDraft> {
        let args = &self.args;
        let mut draft = SessionDraft {
            situation: args.situation.clone().unwrap_or_default(),
            emotional_load: args.load,
            timeframe: args.timeframe,
            frequency: args.frequency,
            ..Default::default()
        };

        for emotion in &args.emotions {
            if draft.selected_emotions.contains(emotion) {
                continue;
            }
            if !is_known_emotion(emotion) {
                warn!("'{}' is not in the emotion catalog", emotion);
            }
            draft.toggle_emotion(emotion);
        }

        match (&args.object, &args.custom_object) {
            (Some(object), custom) if object == CUSTOM_OBJECT => {
                draft.select_object(CUSTOM_OBJECT);
                draft.custom_object = custom.clone().unwrap_or_default();
            }
            (Some(object), _) if PREDEFINED_OBJECTS.contains(&object.as_str()) => {
                draft.select_object(object);
            }
            (Some(object), _) => {
                draft.select_object(CUSTOM_OBJECT);
                draft.custom_object = object.clone();
            }
            (None, Some(custom)) => {
                draft.select_object(CUSTOM_OBJECT);
                draft.custom_object = custom.clone();
            }
            (None, None) => {}
        }

        for param in &args.params {
            let (kind, value) = parse_key_value_pair(param).ok_or_else(|| {
                CliError::ArgParse(format!("invalid parameter '{}', expected KIND=VALUE", param))
            })?;
            let kind = SubmodalityKind::from_str(kind.trim())
                .map_err(|_| CliError::ArgParse(format!("unknown submodality '{}'", kind)))?;
            draft.params.set(kind, value);
        }

        Ok(draft)
    }

    fn generator(&self, context: &CliContext) -> Result<Generator> {
        if !self.args.remote {
            return Ok(Generator::Simulated);
        }
        let settings = &context.settings;
        let config_path = settings.engine_config.as_ref().ok_or_else(|| {
            CliError::Config("generate --remote needs `engine_config` in the settings file".into())
        })?;

        let overrides = self
            .args
            .overrides
            .iter()
            .map(|pair| {
                parse_key_value_pair(pair).ok_or_else(|| {
                    CliError::ArgParse(format!("invalid override '{}', expected KEY=VALUE", pair))
                })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let engine_config = load_engine_config_file(
            &config_path.to_string_lossy(),
            &settings.engine,
            &overrides,
        )?;
        let engine = create_engine(&engine_config)
            .map_err(|e| CliError::Engine(e.to_string()))?;
        debug!("Using {} engine", engine.name());
        Ok(Generator::Remote(Arc::from(engine)))
    }

    fn print(&self, context: &CliContext, owner_id: &str, generation: &Generation) -> Result<()> {
        let out = match self.args.format {
            OutputFormat::Json => to_json(&json!({
                "owner_id": owner_id,
                "input": generation.input,
                "output": generation.output,
                "rendered": generation.rendered,
            }))?,
            OutputFormat::Text => generation.output.to_text(),
            format => render_tree(&generation.rendered, format, context.color)?,
        };
        println!("{}", out.trim_end());
        Ok(())
    }
}

impl CommandHandler for GenerateCommand {
    async fn execute(&self, context: &CliContext) -> Result<()> {
        let draft = self.draft()?;
        let generator = self.generator(context)?;
        let history = context.open_history().await?;
        let owner_id = history.owner_id.clone();

        let session = ReframeSession::new(generator, history.owner_id).with_history(history.store);
        let generation = session.generate(&draft).await?;
        self.print(context, &owner_id, &generation)?;

        if let Some(save) = generation.save {
            save.await.context("History save task failed")?;
        }
        Ok(())
    }
}
