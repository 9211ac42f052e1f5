use anyhow::{Context, Result};
use reencuadre_core::render::parse_and_render;
use std::fs;

use super::{CliContext, CommandHandler};
use crate::args::RenderArgs;
use crate::output::render_tree;

pub struct RenderCommand {
    args: RenderArgs,
}

impl RenderCommand {
    pub fn new(args: RenderArgs) -> Self {
        Self { args }
    }
}

impl CommandHandler for RenderCommand {
    async fn execute(&self, context: &CliContext) -> Result<()> {
        let path = &self.args.file;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read '{}'", path.display()))?;
        let tree = parse_and_render(&text);
        println!("{}", render_tree(&tree, self.args.format, context.color)?.trim_end());
        Ok(())
    }
}
