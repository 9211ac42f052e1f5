use anyhow::Result;
use owo_colors::{AnsiColors, OwoColorize};
use reencuadre_core::catalog::{EmotionEntry, EMOTIONS, PREDEFINED_OBJECTS};
use reencuadre_core::input::{Frequency, SubmodalityKind, Timeframe};
use strum::IntoEnumIterator;

use super::{CliContext, CommandHandler};

pub struct CatalogCommand;

fn tag_color(tag: &str) -> AnsiColors {
    match tag {
        "red" => AnsiColors::Red,
        "orange" => AnsiColors::Yellow,
        "yellow" => AnsiColors::BrightYellow,
        "blue" => AnsiColors::Blue,
        "purple" => AnsiColors::Magenta,
        "pink" => AnsiColors::BrightMagenta,
        "gray" => AnsiColors::BrightBlack,
        _ => AnsiColors::Default,
    }
}

impl CatalogCommand {
    fn emotion_line(entry: &EmotionEntry, color: bool) -> String {
        let label = if color {
            entry.display_label.color(tag_color(entry.color_tag)).to_string()
        } else {
            entry.display_label.to_string()
        };
        format!("  {:<14} → {}", label, entry.virtue)
    }

    pub fn listing(color: bool) -> String {
        let mut out = vec!["Emociones (virtud):".to_string()];
        out.extend(EMOTIONS.iter().map(|e| Self::emotion_line(e, color)));

        out.push("Objetos representativos:".to_string());
        out.push(format!("  {}", PREDEFINED_OBJECTS.join(", ")));

        out.push("Submodalidades (--param KIND=VALUE):".to_string());
        out.push(format!(
            "  {}",
            SubmodalityKind::iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        out.push("Tiempo (--timeframe):".to_string());
        out.extend(Timeframe::iter().map(|t| format!("  {:<16} {}", t, t.label())));
        out.push("Frecuencia (--frequency):".to_string());
        out.extend(Frequency::iter().map(|f| format!("  {:<16} {}", f, f.label())));
        out.join("\n")
    }
}

impl CommandHandler for CatalogCommand {
    async fn execute(&self, context: &CliContext) -> Result<()> {
        println!("{}", Self::listing(context.color));
        Ok(())
    }
}
