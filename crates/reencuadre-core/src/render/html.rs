use super::{Block, Inline, RenderTree};

/// Renders a tree to an HTML fragment. All text is escaped; the only
/// markup produced is the one implied by the tree structure.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn inlines(nodes: &[Inline]) -> String {
    nodes
        .iter()
        .map(|node| match node {
            Inline::Text(t) => escape_html(t),
            Inline::Strong(t) => format!("<strong>{}</strong>", escape_html(t)),
            Inline::LineBreak => "<br/>".to_string(),
        })
        .collect()
}

impl HtmlRenderer {
    pub fn render(&self, tree: &RenderTree) -> String {
        let mut out = String::new();
        out.push_str(&format!("<h2>{}</h2>\n", escape_html(&tree.title)));
        if !tree.intro.is_empty() {
            out.push_str(&format!("<p class=\"intro\">{}</p>\n", inlines(&tree.intro)));
        }
        for section in &tree.sections {
            out.push_str("<section>\n");
            out.push_str(&format!("<h3>{}</h3>\n", escape_html(&section.heading)));
            match &section.block {
                Block::Table { headers, rows } => {
                    out.push_str("<table>\n<thead><tr>");
                    for header in headers {
                        out.push_str(&format!("<th>{}</th>", escape_html(header)));
                    }
                    out.push_str("</tr></thead>\n<tbody>\n");
                    for row in rows {
                        out.push_str("<tr>");
                        for cell in row {
                            out.push_str(&format!("<td>{}</td>", inlines(cell)));
                        }
                        out.push_str("</tr>\n");
                    }
                    out.push_str("</tbody>\n</table>\n");
                }
                Block::Rich { content } => {
                    if !content.is_empty() {
                        out.push_str(&format!("<div>{}</div>\n", inlines(content)));
                    }
                }
            }
            out.push_str("</section>\n");
        }
        out
    }
}
