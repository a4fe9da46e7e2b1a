//! Marker-tag processing, HTML stripping and image-link rewriting.
//!
//! Documents carry custom marker tags (`<llm-only>`, `<llm-exclude>`, or any
//! configured tag) that select content for the generated artifacts. The tags
//! surface in the parsed tree as raw-HTML nodes, in two shapes: a single node
//! containing the whole `<tag>...</tag>` span, or an opening and a closing
//! node split across siblings with real content between them. Both shapes are
//! handled at block level and at inline level.
//!
//! Splice operations always run in reverse index order so earlier indices
//! stay valid while nodes are removed.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::markdown::{parse_document, Block, Inline};

/// What to do with a matched tag span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagIntent {
    /// Delete the tags and everything between them.
    Remove,
    /// Delete only the tags, keeping the content between them.
    Unwrap,
}

fn full_tag_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    RegexBuilder::new(&format!(r"<{tag}(?:\s[^>]*)?>(.*?)</{tag}>"))
        .dot_matches_new_line(true)
        .case_insensitive(true)
        .build()
        .expect("escaped tag name always forms a valid pattern")
}

fn open_tag_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    RegexBuilder::new(&format!(r"<{tag}(?:\s[^>]*)?>"))
        .case_insensitive(true)
        .build()
        .expect("escaped tag name always forms a valid pattern")
}

fn close_tag_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    RegexBuilder::new(&format!(r"</{tag}\s*>"))
        .case_insensitive(true)
        .build()
        .expect("escaped tag name always forms a valid pattern")
}

/// Remove or unwrap every `<tag>...</tag>` span in the tree.
pub fn process_tag(blocks: &mut Vec<Block>, intent: TagIntent, tag: &str) {
    let full = full_tag_regex(tag);
    let open = open_tag_regex(tag);
    let close = close_tag_regex(tag);

    process_block_level(blocks, intent, &full, &open, &close);
}

fn process_block_level(blocks: &mut Vec<Block>, intent: TagIntent, full: &Regex, open: &Regex, close: &Regex) {
    // Children first, so nested containers are already settled when the
    // sibling-level splices run.
    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote { children } => {
                process_block_level(children, intent, full, open, close);
            }
            Block::List { items, .. } => {
                for item in items {
                    process_block_level(&mut item.children, intent, full, open, close);
                }
            }
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                process_inline_level(content, intent, full, open, close);
            }
            _ => {}
        }
    }

    // Paragraphs emptied by inline removal go away with the tags.
    blocks.retain(|b| !is_empty_paragraph(b));

    let matches = collect_block_matches(blocks, full, open, close);
    for m in matches.into_iter().rev() {
        match m {
            TagMatch::Single(i) => match intent {
                TagIntent::Remove => {
                    blocks.remove(i);
                }
                TagIntent::Unwrap => {
                    if let Block::Html { content } = &blocks[i] {
                        let inner = full
                            .captures(content)
                            .and_then(|c| c.get(1))
                            .map(|g| g.as_str().trim().to_string())
                            .unwrap_or_default();
                        if inner.is_empty() {
                            blocks.remove(i);
                        } else {
                            blocks[i] = Block::Html { content: inner };
                        }
                    }
                }
            },
            TagMatch::Span(start, end) => match intent {
                TagIntent::Remove => {
                    blocks.drain(start..=end);
                }
                TagIntent::Unwrap => {
                    blocks.remove(end);
                    blocks.remove(start);
                }
            },
        }
    }
}

fn process_inline_level(inlines: &mut Vec<Inline>, intent: TagIntent, full: &Regex, open: &Regex, close: &Regex) {
    let matches = collect_inline_matches(inlines, full, open, close);
    for m in matches.into_iter().rev() {
        match m {
            TagMatch::Single(i) => match intent {
                TagIntent::Remove => {
                    inlines.remove(i);
                }
                TagIntent::Unwrap => {
                    if let Inline::Html(html) = &inlines[i] {
                        let inner = full
                            .captures(html)
                            .and_then(|c| c.get(1))
                            .map(|g| g.as_str().trim().to_string())
                            .unwrap_or_default();
                        if inner.is_empty() {
                            inlines.remove(i);
                        } else {
                            inlines[i] = Inline::Text(inner);
                        }
                    }
                }
            },
            TagMatch::Span(start, end) => match intent {
                TagIntent::Remove => {
                    inlines.drain(start..=end);
                }
                TagIntent::Unwrap => {
                    inlines.remove(end);
                    inlines.remove(start);
                }
            },
        }
    }
}

enum TagMatch {
    /// One raw node containing both the opening and the closing tag.
    Single(usize),
    /// Opening-tag node and closing-tag node at separate sibling indices.
    Span(usize, usize),
}

fn collect_block_matches(blocks: &[Block], full: &Regex, open: &Regex, close: &Regex) -> Vec<TagMatch> {
    let html_of = |b: &Block| match b {
        Block::Html { content } => Some(content.clone()),
        _ => None,
    };
    collect_matches(blocks.len(), |i| html_of(&blocks[i]), full, open, close)
}

fn collect_inline_matches(inlines: &[Inline], full: &Regex, open: &Regex, close: &Regex) -> Vec<TagMatch> {
    let html_of = |i: &Inline| match i {
        Inline::Html(html) => Some(html.clone()),
        _ => None,
    };
    collect_matches(inlines.len(), |i| html_of(&inlines[i]), full, open, close)
}

fn collect_matches(
    len: usize,
    html_at: impl Fn(usize) -> Option<String>,
    full: &Regex,
    open: &Regex,
    close: &Regex,
) -> Vec<TagMatch> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i < len {
        let Some(html) = html_at(i) else {
            i += 1;
            continue;
        };
        if full.is_match(&html) {
            matches.push(TagMatch::Single(i));
            i += 1;
            continue;
        }
        if open.is_match(&html) {
            // Nearest following sibling carrying the closing tag.
            let closing = (i + 1..len)
                .find(|&j| html_at(j).is_some_and(|h| close.is_match(&h)));
            if let Some(j) = closing {
                matches.push(TagMatch::Span(i, j));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    matches
}

fn is_empty_paragraph(block: &Block) -> bool {
    match block {
        Block::Paragraph { content } => match content.as_slice() {
            [] => true,
            [Inline::Text(text)] => text.trim().is_empty(),
            _ => false,
        },
        _ => false,
    }
}

/// Drop paragraphs left with no content, recursively.
pub fn prune_empty_paragraphs(blocks: &mut Vec<Block>) {
    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote { children } => prune_empty_paragraphs(children),
            Block::List { items, .. } => {
                for item in items {
                    prune_empty_paragraphs(&mut item.children);
                }
            }
            _ => {}
        }
    }
    blocks.retain(|b| !is_empty_paragraph(b));
}

/// Delete every raw-HTML node from the tree, block and inline level.
pub fn strip_html(blocks: &mut Vec<Block>) {
    blocks.retain(|b| !matches!(b, Block::Html { .. }));
    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote { children } => strip_html(children),
            Block::List { items, .. } => {
                for item in items {
                    strip_html(&mut item.children);
                }
            }
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                strip_inline_html(content);
            }
            Block::Table { headers, rows } => {
                for cell in headers.iter_mut() {
                    strip_inline_html(cell);
                }
                for row in rows {
                    for cell in row.iter_mut() {
                        strip_inline_html(cell);
                    }
                }
            }
            _ => {}
        }
    }
    prune_empty_paragraphs(blocks);
}

fn strip_inline_html(inlines: &mut Vec<Inline>) {
    inlines.retain(|i| !matches!(i, Inline::Html(_)));
    for inline in inlines.iter_mut() {
        match inline {
            Inline::Link { content, .. }
            | Inline::Emphasis(content)
            | Inline::Strong(content)
            | Inline::Strikethrough(content) => strip_inline_html(content),
            _ => {}
        }
    }
}

/// Point image references at their emitted asset paths.
///
/// The map is keyed by bare filename; a matched image URL is replaced with a
/// root-relative reference to the mapped path.
pub fn rewrite_image_urls(blocks: &mut [Block], assets: &HashMap<String, String>) {
    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote { children } => rewrite_image_urls(children, assets),
            Block::List { items, .. } => {
                for item in items {
                    rewrite_image_urls(&mut item.children, assets);
                }
            }
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                rewrite_inline_image_urls(content, assets);
            }
            Block::Table { headers, rows } => {
                for cell in headers.iter_mut() {
                    rewrite_inline_image_urls(cell, assets);
                }
                for row in rows {
                    for cell in row.iter_mut() {
                        rewrite_inline_image_urls(cell, assets);
                    }
                }
            }
            _ => {}
        }
    }
}

fn rewrite_inline_image_urls(inlines: &mut [Inline], assets: &HashMap<String, String>) {
    for inline in inlines.iter_mut() {
        match inline {
            Inline::Image { url, .. } => {
                let basename = url.rsplit('/').next().unwrap_or(url.as_str());
                if let Some(resolved) = assets.get(basename) {
                    *url = format!("/{resolved}");
                }
            }
            Inline::Link { content, .. }
            | Inline::Emphasis(content)
            | Inline::Strong(content)
            | Inline::Strikethrough(content) => rewrite_inline_image_urls(content, assets),
            _ => {}
        }
    }
}

/// Splice `<!-- @llm-include ... -->` comment blocks with the Markdown they
/// carry, parsed in place.
pub fn expand_llm_include(blocks: &mut Vec<Block>) {
    let include =
        RegexBuilder::new(r"^\s*<!--\s*@llm-include\s(.*?)-->\s*$")
            .dot_matches_new_line(true)
            .build()
            .expect("literal pattern is valid");

    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote { children } => expand_llm_include(children),
            Block::List { items, .. } => {
                for item in items {
                    expand_llm_include(&mut item.children);
                }
            }
            _ => {}
        }
    }

    let mut i = blocks.len();
    while i > 0 {
        i -= 1;
        let inner = match &blocks[i] {
            Block::Html { content } => include
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|g| g.as_str().trim().to_string()),
            _ => None,
        };
        if let Some(markdown) = inner {
            let replacement = parse_document(&markdown);
            blocks.splice(i..=i, replacement);
        }
    }
}

/// Unwrap `<tag>...</tag>` spans on raw source text, keeping the content.
///
/// Runs before any tree is built; pipelines that never parse still get the
/// marker semantics.
pub fn unwrap_tag_raw(source: &str, tag: &str) -> String {
    let full = full_tag_regex(tag);
    full.replace_all(source, "$1").into_owned()
}

/// Remove `<tag>...</tag>` spans, content included, on raw source text.
pub fn remove_tag_raw(source: &str, tag: &str) -> String {
    let full = full_tag_regex(tag);
    full.replace_all(source, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render_markdown;

    fn transform(source: &str, intent: TagIntent, tag: &str) -> String {
        let mut blocks = parse_document(source);
        process_tag(&mut blocks, intent, tag);
        prune_empty_paragraphs(&mut blocks);
        render_markdown(&blocks)
    }

    #[test]
    fn unwrap_single_inline_node() {
        let out = transform("<llm-only>X</llm-only>\n", TagIntent::Unwrap, "llm-only");
        assert_eq!(out, "X\n");
    }

    #[test]
    fn unwrap_split_inline_nodes() {
        let out = transform(
            "before <llm-only>kept</llm-only> after\n",
            TagIntent::Unwrap,
            "llm-only",
        );
        assert_eq!(out, "before kept after\n");
    }

    #[test]
    fn unwrap_split_block_nodes() {
        let source = "<llm-only>\n\nOnly for models.\n\n</llm-only>\n";
        let out = transform(source, TagIntent::Unwrap, "llm-only");
        assert_eq!(out, "Only for models.\n");
    }

    #[test]
    fn remove_single_node_leaves_nothing() {
        let out = transform(
            "<llm-exclude>humans only</llm-exclude>\n",
            TagIntent::Remove,
            "llm-exclude",
        );
        assert_eq!(out, "");
    }

    #[test]
    fn remove_split_block_span_deletes_content_between() {
        let source = "keep\n\n<llm-exclude>\n\ndrop this\n\n</llm-exclude>\n\nalso keep\n";
        let out = transform(source, TagIntent::Remove, "llm-exclude");
        assert_eq!(out, "keep\n\nalso keep\n");
    }

    #[test]
    fn remove_split_inline_span() {
        let out = transform(
            "a <llm-exclude>b</llm-exclude> c\n",
            TagIntent::Remove,
            "llm-exclude",
        );
        assert_eq!(out, "a  c\n");
    }

    #[test]
    fn custom_tag_names_are_escaped() {
        assert_eq!(unwrap_tag_raw("<my.tag>X</my.tag>", "my.tag"), "X");
        // The escaped dot must not match an arbitrary character.
        assert_eq!(
            unwrap_tag_raw("<myxtag>X</myxtag>", "my.tag"),
            "<myxtag>X</myxtag>"
        );
    }

    #[test]
    fn paragraph_emptied_by_removal_is_pruned() {
        let out = transform(
            "first\n\n<llm-exclude>gone</llm-exclude>\n\nlast\n",
            TagIntent::Remove,
            "llm-exclude",
        );
        assert_eq!(out, "first\n\nlast\n");
    }

    #[test]
    fn unclosed_tag_left_alone() {
        let out = transform("text <llm-only>dangling\n", TagIntent::Remove, "llm-only");
        assert_eq!(out, "text <llm-only>dangling\n");
    }

    #[test]
    fn strip_html_drops_all_raw_nodes() {
        let mut blocks = parse_document("<div>block</div>\n\ntext with <b>inline</b> html\n");
        strip_html(&mut blocks);
        assert_eq!(render_markdown(&blocks), "text with inline html\n");
    }

    #[test]
    fn strip_html_prunes_emptied_paragraph() {
        let mut blocks = parse_document("keep\n\n<br/>\n");
        strip_html(&mut blocks);
        assert_eq!(render_markdown(&blocks), "keep\n");
    }

    #[test]
    fn rewrites_mapped_image_urls() {
        let mut blocks = parse_document("![logo](./images/logo.png)\n");
        let assets = HashMap::from([(
            "logo.png".to_string(),
            "assets/logo.BvX2a.png".to_string(),
        )]);
        rewrite_image_urls(&mut blocks, &assets);
        assert_eq!(render_markdown(&blocks), "![logo](/assets/logo.BvX2a.png)\n");
    }

    #[test]
    fn unmapped_image_urls_untouched() {
        let mut blocks = parse_document("![ext](https://example.com/pic.png)\n");
        rewrite_image_urls(&mut blocks, &HashMap::new());
        assert_eq!(render_markdown(&blocks), "![ext](https://example.com/pic.png)\n");
    }

    #[test]
    fn llm_include_splices_parsed_markdown() {
        let source = "intro\n\n<!-- @llm-include\n## Spliced\n\nbody text\n-->\n\noutro\n";
        let mut blocks = parse_document(source);
        expand_llm_include(&mut blocks);
        assert_eq!(
            render_markdown(&blocks),
            "intro\n\n## Spliced\n\nbody text\n\noutro\n"
        );
    }

    #[test]
    fn plain_comments_are_not_includes() {
        let mut blocks = parse_document("<!-- just a note -->\n");
        expand_llm_include(&mut blocks);
        assert_eq!(render_markdown(&blocks), "<!-- just a note -->\n");
    }

    #[test]
    fn raw_unwrap_keeps_inner_text() {
        assert_eq!(
            unwrap_tag_raw("a <llm-only>X</llm-only> b", "llm-only"),
            "a X b"
        );
    }

    #[test]
    fn raw_unwrap_spans_lines() {
        assert_eq!(
            unwrap_tag_raw("<llm-only>\nline one\nline two\n</llm-only>", "llm-only"),
            "\nline one\nline two\n"
        );
    }

    #[test]
    fn raw_remove_drops_span() {
        assert_eq!(
            remove_tag_raw("keep <llm-exclude>secret</llm-exclude> keep", "llm-exclude"),
            "keep  keep"
        );
    }

    #[test]
    fn tag_processing_is_idempotent() {
        let once = transform("a <llm-only>b</llm-only> c\n", TagIntent::Unwrap, "llm-only");
        let mut blocks = parse_document(&once);
        process_tag(&mut blocks, TagIntent::Unwrap, "llm-only");
        assert_eq!(render_markdown(&blocks), once);
    }
}
