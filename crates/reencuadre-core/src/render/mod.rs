//! Result parsing and the render tree.
//!
//! A [`RenderTree`] is built either directly from a [`ComposedResult`], by
//! parsing composed text with [`parse_and_render`], or opaquely from free
//! text returned by a model. The tree holds no markup: emphasis and line
//! breaks are explicit [`Inline`] nodes and every renderer escapes text.

pub mod html;
pub mod terminal;

use crate::composer::{ComposedResult, SectionBody, Table};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub use html::HtmlRenderer;
pub use terminal::TerminalRenderer;

pub const DEFAULT_TITLE: &str = "Resultado del Reencuadre";

/// Title fragments that mark the section rendered as a table.
pub const TABLE_SECTION_MARKERS: &[&str] = &["Reencuadre por Marcos", "Frame-based reframing"];

static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:SECCIÓN|SECTION) \d+:").expect("valid regex"));

static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Strong(String),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Rich {
        content: Vec<Inline>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub heading: String,
    pub block: Block,
}

impl RenderedSection {
    pub fn is_table(&self) -> bool {
        matches!(self.block, Block::Table { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub title: String,
    pub intro: Vec<Inline>,
    pub sections: Vec<RenderedSection>,
}

impl RenderTree {
    /// Renders a composed result without going through its text form.
    pub fn from_composed(result: &ComposedResult) -> Self {
        let sections = result
            .sections
            .iter()
            .map(|section| RenderedSection {
                heading: section.heading(),
                block: match &section.body {
                    SectionBody::Table(table) => table_block(table),
                    SectionBody::Text(text) => Block::Rich {
                        content: rich_text(text.trim()),
                    },
                },
            })
            .collect();

        Self {
            title: result.title.clone(),
            intro: rich_text(result.intro.trim()),
            sections,
        }
    }

    /// Free text shown as one block. No structure is recovered and no
    /// emphasis is interpreted; only line breaks are kept.
    pub fn opaque(text: &str) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            intro: plain_text(text.trim()),
            sections: Vec::new(),
        }
    }

    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    /// Compact view used for past entries: table payloads are dropped and
    /// only their headings remain.
    pub fn without_tables(&self) -> Self {
        let sections = self
            .sections
            .iter()
            .map(|section| match section.block {
                Block::Table { .. } => RenderedSection {
                    heading: section.heading.clone(),
                    block: Block::Rich {
                        content: Vec::new(),
                    },
                },
                Block::Rich { .. } => section.clone(),
            })
            .collect();
        Self {
            title: self.title.clone(),
            intro: self.intro.clone(),
            sections,
        }
    }
}

/// Splits composed text into its title block and numbered sections and
/// renders each one. Malformed table rows, and table sections without a
/// header and divider, are dropped.
pub fn parse_and_render(text: &str) -> RenderTree {
    let chunks = split_sections(text);
    let mut chunks = chunks.into_iter();

    let (title, intro) = match chunks.next() {
        Some(block) => {
            let block = block.trim();
            let mut lines = block.split('\n');
            let title = lines.next().unwrap_or_default().trim().to_string();
            let intro = lines.collect::<Vec<_>>().join("\n");
            (title, intro.trim().to_string())
        }
        None => (DEFAULT_TITLE.to_string(), String::new()),
    };

    let sections = chunks.filter_map(|chunk| render_section(&chunk)).collect();

    RenderTree {
        title,
        intro: rich_text(&intro),
        sections,
    }
}

/// A chunk boundary is a section heading preceded by at least one blank line.
fn split_sections(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let blank = line.trim().is_empty();
        if !blank && previous_blank && SECTION_HEADING.is_match(line) {
            chunks.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
        previous_blank = blank;
    }
    chunks.push(current.join("\n"));

    chunks
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

/// Leading blank lines are skipped; blank lines inside the body are kept as
/// paragraph breaks.
fn render_section(chunk: &str) -> Option<RenderedSection> {
    let mut lines = chunk.lines().skip_while(|l| l.trim().is_empty());
    let heading = lines.next()?.trim().to_string();
    let body = lines.collect::<Vec<_>>().join("\n");
    let body = body.trim();

    if TABLE_SECTION_MARKERS.iter().any(|m| heading.contains(m)) {
        let block = parse_table(body);
        if block.is_none() {
            debug!("Dropping table section without header/divider: {}", heading);
        }
        return block.map(|block| RenderedSection { heading, block });
    }

    Some(RenderedSection {
        heading,
        block: Block::Rich {
            content: rich_text(body),
        },
    })
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_table(body: &str) -> Option<Block> {
    let table_lines: Vec<&str> = body.lines().filter(|l| l.contains('|')).collect();
    if table_lines.len() < 2 {
        return None;
    }

    let headers = split_cells(table_lines[0]);
    let rows = table_lines[2..]
        .iter()
        .map(|line| split_cells(line))
        .filter(|cells| {
            let keep = cells.len() == headers.len();
            if !keep {
                debug!(
                    "Dropping table row with {} cells (expected {})",
                    cells.len(),
                    headers.len()
                );
            }
            keep
        })
        .map(|cells| cells.iter().map(|c| rich_text(c)).collect())
        .collect();

    Some(Block::Table { headers, rows })
}

fn table_block(table: &Table) -> Block {
    Block::Table {
        headers: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .map(|row| row.iter().map(|c| rich_text(c)).collect())
            .collect(),
    }
}

/// `**x**` becomes [`Inline::Strong`], newlines become [`Inline::LineBreak`].
pub fn rich_text(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        let mut last = 0;
        for caps in STRONG.captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(Inline::Text(line[last..whole.start()].to_string()));
            }
            out.push(Inline::Strong(inner.as_str().to_string()));
            last = whole.end();
        }
        if last < line.len() {
            out.push(Inline::Text(line[last..].to_string()));
        }
    }
    out
}

/// Only newlines are interpreted.
pub fn plain_text(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        if !line.is_empty() {
            out.push(Inline::Text(line.to_string()));
        }
    }
    out
}
