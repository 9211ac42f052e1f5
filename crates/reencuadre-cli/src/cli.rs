//! Main CLI entry point and command routing

use anyhow::Result;
use clap::Parser;
use log::debug;

use crate::args::{Command, ReencuadreArgs};
use crate::commands::{
    catalog::CatalogCommand, generate::GenerateCommand, history::HistoryCommand,
    render::RenderCommand, CliContext, CommandHandler,
};
use crate::settings::Settings;

/// Main CLI entry point
pub async fn run() -> Result<()> {
    run_with(ReencuadreArgs::parse()).await
}

pub async fn run_with(args: ReencuadreArgs) -> Result<()> {
    let settings = Settings::load(args.settings.as_deref())?;
    debug!("Settings: {:?}", settings);
    let context = CliContext::new(settings, !args.no_color);

    match args.command {
        Command::Generate(generate) => GenerateCommand::new(generate).execute(&context).await,
        Command::Render(render) => RenderCommand::new(render).execute(&context).await,
        Command::History(history) => HistoryCommand::new(history).execute(&context).await,
        Command::Catalog => CatalogCommand.execute(&context).await,
    }
}

/// Line printed to stderr on failure. Messages that already carry the
/// `Error:` prefix, such as form validation errors, are printed as-is.
pub fn error_line(error: &anyhow::Error) -> String {
    let message = format!("{:#}", error);
    if message.starts_with("Error:") {
        message
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use reencuadre_core::error::ValidationError;

    #[test]
    fn validation_errors_are_not_prefixed_twice() {
        let err = anyhow::Error::from(ValidationError::MissingSituation);
        assert_eq!(error_line(&err), "Error: 1. Situación a Reencuadrar está vacío.");
        assert_eq!(error_line(&anyhow!("boom")), "Error: boom");
    }
}
