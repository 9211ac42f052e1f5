use anyhow::Result;
use reencuadre_core::history::HistoryRecord;

use super::{CliContext, CommandHandler};
use crate::args::{HistoryArgs, OutputFormat};
use crate::output::{render_tree, to_json};

pub const EMPTY_HISTORY: &str = "No hay reencuadres guardados.";
const SEPARATOR: &str = "────────────────────────────────────────";

pub struct HistoryCommand {
    args: HistoryArgs,
}

impl HistoryCommand {
    pub fn new(args: HistoryArgs) -> Self {
        Self { args }
    }

    fn entry_header(record: &HistoryRecord) -> String {
        format!(
            "{} · {} · {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.input.emotions_joined(),
            record.input.situation_text
        )
    }

    pub fn format_records(&self, records: &[HistoryRecord], color: bool) -> Result<String> {
        if self.args.format == OutputFormat::Json {
            return to_json(&records);
        }
        if records.is_empty() {
            return Ok(EMPTY_HISTORY.to_string());
        }

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let tree = record.output.render();
            let tree = if self.args.expanded {
                tree
            } else {
                tree.without_tables()
            };
            entries.push(format!(
                "{}\n{}",
                Self::entry_header(record),
                render_tree(&tree, self.args.format, color)?.trim_end()
            ));
        }
        Ok(entries.join(&format!("\n{}\n", SEPARATOR)))
    }
}

impl CommandHandler for HistoryCommand {
    async fn execute(&self, context: &CliContext) -> Result<()> {
        let history = context.open_history().await?;
        let records = history.store.list(&history.owner_id).await?;
        println!("{}", self.format_records(&records, context.color)?);
        Ok(())
    }
}
