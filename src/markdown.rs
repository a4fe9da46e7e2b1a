//! Block/inline document tree with Markdown parsing and re-rendering.
//!
//! The transformer ([`crate::transform`]) needs to splice raw-HTML nodes out
//! of a document and write the result back as Markdown, so this module keeps
//! an explicit tree instead of working on pulldown-cmark's event stream:
//! every raw tag is an addressable node with an index inside its parent's
//! child list, which is what the reverse-order splice operations require.
//!
//! Parsing builds the tree from pulldown-cmark events with a builder stack;
//! rendering writes canonical Markdown (ATX headings, `-` bullets, fenced
//! code blocks). Incidental source formatting is normalized, content is not.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// A block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    CodeBlock { language: Option<String>, content: String },
    List { ordered: bool, start: u64, items: Vec<ListItem> },
    BlockQuote { children: Vec<Block> },
    Table { headers: Vec<Vec<Inline>>, rows: Vec<Vec<Vec<Inline>>> },
    Rule,
    /// Raw HTML block, kept verbatim. The transformer treats these (and
    /// [`Inline::Html`]) as the markup nodes it removes or unwraps.
    Html { content: String },
}

/// One list item; tight items hold a single synthesized paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Task-list checkbox state, when present.
    pub checked: Option<bool>,
    pub children: Vec<Block>,
}

/// An inline-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    /// Raw inline HTML, kept verbatim.
    Html(String),
    Link { content: Vec<Inline>, url: String, title: Option<String> },
    Image { alt: String, url: String, title: Option<String> },
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    SoftBreak,
    HardBreak,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Parse Markdown source (frontmatter already detached) into a block tree.
pub fn parse_document(source: &str) -> Vec<Block> {
    let parser = Parser::new_ext(source, parser_options());

    let mut root: Vec<Block> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for event in parser {
        match event {
            Event::Start(tag) => stack.push(Frame::from_tag(tag)),
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    frame.finish(&mut stack, &mut root);
                }
            }
            Event::Text(text) => match stack.last_mut() {
                Some(frame) if frame.collects_raw() => frame.raw.push_str(&text),
                Some(frame) => frame.inlines.push(Inline::Text(text.to_string())),
                None => {}
            },
            Event::Code(code) => {
                if let Some(frame) = stack.last_mut() {
                    frame.inlines.push(Inline::Code(code.to_string()));
                }
            }
            Event::Html(html) => match stack.last_mut() {
                Some(frame) if frame.collects_raw() => frame.raw.push_str(&html),
                Some(_) | None => {
                    attach_block(&mut stack, &mut root, Block::Html { content: html.to_string() })
                }
            },
            Event::InlineHtml(html) => {
                if let Some(frame) = stack.last_mut() {
                    frame.inlines.push(Inline::Html(html.to_string()));
                }
            }
            Event::SoftBreak => {
                if let Some(frame) = stack.last_mut() {
                    frame.inlines.push(Inline::SoftBreak);
                }
            }
            Event::HardBreak => {
                if let Some(frame) = stack.last_mut() {
                    frame.inlines.push(Inline::HardBreak);
                }
            }
            Event::Rule => attach_block(&mut stack, &mut root, Block::Rule),
            Event::TaskListMarker(checked) => {
                if let Some(frame) = stack.iter_mut().rev().find(|f| matches!(f.kind, Kind::Item)) {
                    frame.checked = Some(checked);
                }
            }
            Event::FootnoteReference(name) => {
                if let Some(frame) = stack.last_mut() {
                    frame.inlines.push(Inline::Text(format!("[^{name}]")));
                }
            }
            _ => {}
        }
    }

    root
}

#[derive(Debug)]
enum Kind {
    Paragraph,
    Heading(u8),
    CodeBlock(Option<String>),
    HtmlBlock,
    List { ordered: bool, start: u64 },
    Item,
    BlockQuote,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
    /// Container we do not model; its blocks flow into the parent.
    Transparent,
}

#[derive(Debug)]
struct Frame {
    kind: Kind,
    inlines: Vec<Inline>,
    blocks: Vec<Block>,
    items: Vec<ListItem>,
    head: Vec<Vec<Inline>>,
    rows: Vec<Vec<Vec<Inline>>>,
    cells: Vec<Vec<Inline>>,
    raw: String,
    checked: Option<bool>,
}

impl Frame {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            inlines: Vec::new(),
            blocks: Vec::new(),
            items: Vec::new(),
            head: Vec::new(),
            rows: Vec::new(),
            cells: Vec::new(),
            raw: String::new(),
            checked: None,
        }
    }

    fn from_tag(tag: Tag) -> Self {
        let kind = match tag {
            Tag::Paragraph => Kind::Paragraph,
            Tag::Heading { level, .. } => Kind::Heading(level as u8),
            Tag::CodeBlock(CodeBlockKind::Fenced(lang)) => {
                let lang = lang.to_string();
                Kind::CodeBlock(if lang.is_empty() { None } else { Some(lang) })
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => Kind::CodeBlock(None),
            Tag::HtmlBlock => Kind::HtmlBlock,
            Tag::List(start) => Kind::List { ordered: start.is_some(), start: start.unwrap_or(1) },
            Tag::Item => Kind::Item,
            Tag::BlockQuote(_) => Kind::BlockQuote,
            Tag::Table(_) => Kind::Table,
            Tag::TableHead => Kind::TableHead,
            Tag::TableRow => Kind::TableRow,
            Tag::TableCell => Kind::TableCell,
            Tag::Emphasis => Kind::Emphasis,
            Tag::Strong => Kind::Strong,
            Tag::Strikethrough => Kind::Strikethrough,
            Tag::Link { dest_url, title, .. } => Kind::Link {
                url: dest_url.to_string(),
                title: non_empty(title.to_string()),
            },
            Tag::Image { dest_url, title, .. } => Kind::Image {
                url: dest_url.to_string(),
                title: non_empty(title.to_string()),
            },
            _ => Kind::Transparent,
        };
        Self::new(kind)
    }

    fn collects_raw(&self) -> bool {
        matches!(self.kind, Kind::CodeBlock(_) | Kind::HtmlBlock)
    }

    /// Attach the closed frame's result to its parent (or the root).
    fn finish(self, stack: &mut Vec<Frame>, root: &mut Vec<Block>) {
        match self.kind {
            Kind::Paragraph => {
                attach_block(stack, root, Block::Paragraph { content: self.inlines })
            }
            Kind::Heading(level) => {
                attach_block(stack, root, Block::Heading { level, content: self.inlines })
            }
            Kind::CodeBlock(language) => {
                attach_block(stack, root, Block::CodeBlock { language, content: self.raw })
            }
            Kind::HtmlBlock => {
                if !self.raw.is_empty() {
                    attach_block(stack, root, Block::Html { content: self.raw });
                }
            }
            Kind::List { ordered, start } => {
                attach_block(stack, root, Block::List { ordered, start, items: self.items })
            }
            Kind::Item => {
                let mut children = Vec::new();
                if !self.inlines.is_empty() {
                    children.push(Block::Paragraph { content: self.inlines });
                }
                children.extend(self.blocks);
                if let Some(list) = stack.iter_mut().rev().find(|f| matches!(f.kind, Kind::List { .. })) {
                    list.items.push(ListItem { checked: self.checked, children });
                }
            }
            Kind::BlockQuote => {
                attach_block(stack, root, Block::BlockQuote { children: self.blocks })
            }
            Kind::Table => {
                attach_block(stack, root, Block::Table { headers: self.head, rows: self.rows })
            }
            Kind::TableHead => {
                if let Some(table) = stack.last_mut() {
                    table.head = self.cells;
                }
            }
            Kind::TableRow => {
                if let Some(table) = stack.last_mut() {
                    table.rows.push(self.cells);
                }
            }
            Kind::TableCell => {
                if let Some(row) = stack.last_mut() {
                    row.cells.push(self.inlines);
                }
            }
            Kind::Emphasis => attach_inline(stack, Inline::Emphasis(self.inlines)),
            Kind::Strong => attach_inline(stack, Inline::Strong(self.inlines)),
            Kind::Strikethrough => attach_inline(stack, Inline::Strikethrough(self.inlines)),
            Kind::Link { url, title } => {
                attach_inline(stack, Inline::Link { content: self.inlines, url, title })
            }
            Kind::Image { url, title } => {
                let alt = inline_text(&self.inlines);
                attach_inline(stack, Inline::Image { alt, url, title })
            }
            Kind::Transparent => {
                for block in self.blocks {
                    attach_block(stack, root, block);
                }
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn attach_block(stack: &mut Vec<Frame>, root: &mut Vec<Block>, block: Block) {
    match stack
        .iter_mut()
        .rev()
        .find(|f| matches!(f.kind, Kind::Item | Kind::BlockQuote | Kind::Transparent))
    {
        Some(container) => container.blocks.push(block),
        None => root.push(block),
    }
}

fn attach_inline(stack: &mut Vec<Frame>, inline: Inline) {
    if let Some(frame) = stack.last_mut() {
        frame.inlines.push(inline);
    }
}

/// Render a block tree back to Markdown.
pub fn render_markdown(blocks: &[Block]) -> String {
    let rendered: Vec<String> = blocks.iter().map(render_block).collect();
    let mut out = rendered.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(*level as usize), render_inlines(content))
        }
        Block::Paragraph { content } => render_inlines(content),
        Block::CodeBlock { language, content } => {
            let fence = if content.contains("```") { "````" } else { "```" };
            let body = if content.is_empty() || content.ends_with('\n') {
                content.clone()
            } else {
                format!("{content}\n")
            };
            format!("{fence}{}\n{body}{fence}", language.as_deref().unwrap_or(""))
        }
        Block::List { ordered, start, items } => render_list(*ordered, *start, items),
        Block::BlockQuote { children } => {
            let inner: Vec<String> = children.iter().map(render_block).collect();
            inner
                .join("\n\n")
                .lines()
                .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Block::Table { headers, rows } => render_table(headers, rows),
        Block::Rule => "---".to_string(),
        Block::Html { content } => content.trim_end().to_string(),
    }
}

fn render_list(ordered: bool, start: u64, items: &[ListItem]) -> String {
    let mut lines = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", start + i as u64)
        } else {
            match item.checked {
                Some(true) => "- [x] ".to_string(),
                Some(false) => "- [ ] ".to_string(),
                None => "- ".to_string(),
            }
        };
        let indent = " ".repeat(marker.len());

        let mut body = String::new();
        for (j, child) in item.children.iter().enumerate() {
            if j > 0 {
                // Nested lists sit tight under their parent line; other
                // blocks keep a separating blank line.
                if matches!(child, Block::List { .. }) {
                    body.push('\n');
                } else {
                    body.push_str("\n\n");
                }
            }
            body.push_str(&render_block(child));
        }

        for (j, line) in body.lines().enumerate() {
            if j == 0 {
                lines.push(format!("{marker}{line}"));
            } else if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{indent}{line}"));
            }
        }
        if body.is_empty() {
            lines.push(marker.trim_end().to_string());
        }
    }

    lines.join("\n")
}

fn render_table(headers: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>]) -> String {
    let mut lines = Vec::new();

    let header_cells: Vec<String> = headers.iter().map(|c| render_inlines(c)).collect();
    lines.push(format!("| {} |", header_cells.join(" | ")));
    lines.push(format!(
        "| {} |",
        header_cells.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    ));

    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| render_inlines(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                if code.contains('`') {
                    out.push_str(&format!("`` {code} ``"));
                } else {
                    out.push_str(&format!("`{code}`"));
                }
            }
            Inline::Html(html) => out.push_str(html),
            Inline::Link { content, url, title } => {
                out.push_str(&format!(
                    "[{}]({}{})",
                    render_inlines(content),
                    url,
                    title_suffix(title)
                ));
            }
            Inline::Image { alt, url, title } => {
                out.push_str(&format!("![{alt}]({url}{})", title_suffix(title)));
            }
            Inline::Emphasis(content) => out.push_str(&format!("*{}*", render_inlines(content))),
            Inline::Strong(content) => out.push_str(&format!("**{}**", render_inlines(content))),
            Inline::Strikethrough(content) => {
                out.push_str(&format!("~~{}~~", render_inlines(content)));
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("\\\n"),
        }
    }
    out
}

fn title_suffix(title: &Option<String>) -> String {
    match title {
        Some(t) => format!(" \"{t}\""),
        None => String::new(),
    }
}

/// Plain-text content of an inline run, with raw HTML dropped.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => out.push_str(code),
            Inline::Html(_) => {}
            Inline::Link { content, .. } => out.push_str(&inline_text(content)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Emphasis(content) | Inline::Strong(content) | Inline::Strikethrough(content) => {
                out.push_str(&inline_text(content));
            }
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
    out
}

/// Text of the first level-1 heading, if any.
pub fn first_h1(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|block| match block {
        Block::Heading { level: 1, content } => {
            let text = inline_text(content).trim().to_string();
            if text.is_empty() { None } else { Some(text) }
        }
        _ => None,
    })
}
