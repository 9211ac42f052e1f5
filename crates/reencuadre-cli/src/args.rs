use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use reencuadre_core::input::{Frequency, Timeframe, DEFAULT_LOAD};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reencuadre",
    version,
    about = "Reencuadre terapéutico de una situación: marcos, reto estoico y submodalidades"
)]
pub struct ReencuadreArgs {
    #[arg(long, global = true, value_name = "FILE", help = "Settings file (defaults to ./reencuadre.toml if present)")]
    pub settings: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable ANSI colors in terminal output")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Generate a reframe for a situation")]
    Generate(GenerateArgs),

    #[command(about = "Parse and render a composed result file")]
    Render(RenderArgs),

    #[command(about = "List past reframes, newest first")]
    History(HistoryArgs),

    #[command(about = "List emotions, virtues, objects and submodality kinds")]
    Catalog,
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    #[arg(long, short, help = "The situation to reframe")]
    pub situation: Option<String>,

    #[arg(long = "emotion", short, value_name = "ID", action = ArgAction::Append, help = "Selected emotion; the first one is the primary emotion")]
    pub emotions: Vec<String>,

    #[arg(long, short, default_value_t = DEFAULT_LOAD, help = "Emotional load, 1-5")]
    pub load: u8,

    #[arg(long, help = "Representative object")]
    pub object: Option<String>,

    #[arg(long, help = "Object text used when --object is \"Otro...\" or omitted")]
    pub custom_object: Option<String>,

    #[arg(long, short, help = "actual | recuerdo")]
    pub timeframe: Option<Timeframe>,

    #[arg(long, short, help = "repetitivos | poco-frecuentes")]
    pub frequency: Option<Frequency>,

    #[arg(long = "param", value_name = "KIND=VALUE", action = ArgAction::Append, help = "Submodality parameter, e.g. Visual=\"blanco y negro\"")]
    pub params: Vec<String>,

    #[arg(long, help = "Ask the configured model engine instead of the local templates")]
    pub remote: bool,

    #[arg(short, long = "override", value_name = "KEY=VALUE", action = ArgAction::Append, requires = "remote", help = "Override an engine parameter")]
    pub overrides: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(long, help = "Show table sections of each entry")]
    pub expanded: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Html,
    Text,
    Json,
}
