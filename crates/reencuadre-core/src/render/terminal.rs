use super::{Block, Inline, RenderTree};
use owo_colors::OwoColorize;

/// Renders a tree for a terminal, optionally with ANSI styling.
#[derive(Debug, Clone, Copy)]
pub struct TerminalRenderer {
    pub color: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn inlines(&self, nodes: &[Inline], indent: &str) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Inline::Text(t) => out.push_str(t),
                Inline::Strong(t) if self.color => out.push_str(&t.bold().to_string()),
                Inline::Strong(t) => out.push_str(t),
                Inline::LineBreak => {
                    out.push('\n');
                    out.push_str(indent);
                }
            }
        }
        out
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn render(&self, tree: &RenderTree) -> String {
        let mut out = String::new();
        if self.color {
            out.push_str(&tree.title.green().bold().to_string());
        } else {
            out.push_str(&tree.title);
        }
        out.push('\n');
        if !tree.intro.is_empty() {
            out.push('\n');
            out.push_str(&self.inlines(&tree.intro, ""));
            out.push('\n');
        }

        for section in &tree.sections {
            out.push('\n');
            out.push_str(&self.heading(&section.heading));
            out.push('\n');
            match &section.block {
                Block::Table { headers, rows } => {
                    if !headers.is_empty() {
                        out.push_str(&format!("  [{}]\n", headers.join(" / ")));
                    }
                    for row in rows {
                        let mut cells = row.iter();
                        if let Some(first) = cells.next() {
                            out.push_str("  • ");
                            out.push_str(&self.inlines(first, "    "));
                        }
                        for cell in cells {
                            out.push_str("\n    ");
                            out.push_str(&self.inlines(cell, "    "));
                        }
                        out.push('\n');
                    }
                }
                Block::Rich { content } => {
                    if !content.is_empty() {
                        out.push_str("  ");
                        out.push_str(&self.inlines(content, "  "));
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}
