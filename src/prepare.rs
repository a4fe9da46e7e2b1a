//! Turning one raw source document into a [`PreparedFile`].
//!
//! Preparation splits frontmatter from the body, runs the marker-tag and
//! image-link transforms, derives a title and optional description, and
//! resolves the document's output-relative path (route rewrites, then
//! `index.md` collapsing).

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::markdown::{first_h1, parse_document, render_markdown};
use crate::paths::{split_dir_and_file, strip_content_ext, to_posix};
use crate::rewrites::{resolve_output_path, RouteRewrites};
use crate::transform::{
    expand_llm_include, process_tag, prune_empty_paragraphs, rewrite_image_urls, strip_html,
    TagIntent,
};

/// One processed source document, immutable after preparation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFile {
    /// Derived title, never empty.
    pub title: String,
    /// Output-relative path, posix separators, rewrites and `index`
    /// collapsing already applied.
    pub path: String,
    /// Body after transformation, frontmatter detached.
    pub content: String,
    pub frontmatter: Mapping,
}

impl PreparedFile {
    /// Frontmatter `description`, when present and non-empty.
    pub fn description(&self) -> Option<String> {
        frontmatter_str(&self.frontmatter, "description").filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    pub rewrites: RouteRewrites,
    /// Drop all raw-HTML nodes from the transformed body.
    pub strip_html: bool,
    /// Emitted-asset map, image basename to output-relative path.
    pub assets: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("frontmatter in {path} is not a key/value mapping")]
    FrontmatterShape { path: String },
}

/// Prepare one document. `relative_path` is the source path relative to the
/// working directory, in host-native or posix separators.
pub fn prepare(
    raw: &str,
    relative_path: &str,
    options: &PrepareOptions,
) -> Result<PreparedFile, PrepareError> {
    let source_path = to_posix(relative_path);

    let (frontmatter_text, body) = split_frontmatter(raw);
    let frontmatter = parse_frontmatter(frontmatter_text, &source_path)?;

    // Marker tags are processed on the parsed tree only; a tag quoted
    // inside a code fence is content, not markup.
    let mut blocks = parse_document(body);
    process_tag(&mut blocks, TagIntent::Unwrap, "llm-only");
    process_tag(&mut blocks, TagIntent::Remove, "llm-exclude");
    expand_llm_include(&mut blocks);
    if !options.assets.is_empty() {
        rewrite_image_urls(&mut blocks, &options.assets);
    }
    if options.strip_html {
        strip_html(&mut blocks);
    }
    prune_empty_paragraphs(&mut blocks);

    let title = frontmatter_str(&frontmatter, "title")
        .or_else(|| frontmatter_str(&frontmatter, "titleTemplate"))
        .filter(|t| !t.is_empty())
        .or_else(|| first_h1(&blocks))
        .unwrap_or_else(|| "Untitled".to_string());

    let path = collapse_index(&resolve_output_path(&source_path, &options.rewrites));

    Ok(PreparedFile {
        title,
        path,
        content: render_markdown(&blocks),
        frontmatter,
    })
}

/// Split a leading `---` fenced frontmatter block from the body.
/// Documents without a fence get an empty frontmatter and the full text as
/// body.
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix("---") else {
        return (None, raw);
    };
    let Some(after_fence) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in after_fence.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &after_fence[..offset];
            let body = &after_fence[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, raw)
}

fn parse_frontmatter(text: Option<&str>, path: &str) -> Result<Mapping, PrepareError> {
    let Some(text) = text else {
        return Ok(Mapping::new());
    };
    let value: Value =
        serde_yaml::from_str(text).map_err(|source| PrepareError::Frontmatter {
            path: path.to_string(),
            source,
        })?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(PrepareError::FrontmatterShape { path: path.to_string() }),
    }
}

/// `dir/index.md` becomes `dir.md`; a root-level `index.md` stays put.
fn collapse_index(path: &str) -> String {
    let (dir, file) = split_dir_and_file(path);
    if !dir.is_empty() && strip_content_ext(file) == "index" {
        format!("{}.md", dir.trim_end_matches('/'))
    } else {
        path.to_string()
    }
}

/// Read a scalar frontmatter value by dotted path (`hero.name`).
pub fn frontmatter_str(frontmatter: &Mapping, dotted: &str) -> Option<String> {
    let mut current = frontmatter;
    let mut segments = dotted.split('.').peekable();

    while let Some(segment) = segments.next() {
        let value = current.get(Value::String(segment.to_string()))?;
        if segments.peek().is_none() {
            return scalar_to_string(value);
        }
        current = value.as_mapping()?;
    }
    None
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
