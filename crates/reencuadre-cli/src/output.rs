use anyhow::Result;
use reencuadre_core::render::{HtmlRenderer, RenderTree, TerminalRenderer};
use serde::Serialize;

use crate::args::OutputFormat;

/// Renders a tree in one of the markup formats. `Text` is the terminal
/// layout without colors; callers holding canonical text print that instead.
pub fn render_tree(tree: &RenderTree, format: OutputFormat, color: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Terminal => TerminalRenderer::new(color).render(tree),
        OutputFormat::Text => TerminalRenderer::new(false).render(tree),
        OutputFormat::Html => HtmlRenderer.render(tree),
        OutputFormat::Json => to_json(tree)?,
    })
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
