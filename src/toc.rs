//! Table-of-contents synthesis.
//!
//! Reconciles a declared navigation tree against the prepared file set and
//! renders a Markdown TOC. Navigation links rarely match file paths exactly
//! (declarations omit extensions, use directory-style `/guide/` links, and
//! carry inherited base prefixes), so both sides are normalized to a common
//! form before comparison. Sections that resolve to nothing are elided
//! entirely, and files no navigation entry claims land in a trailing
//! `### Other` bucket.

use serde::Deserialize;

use crate::paths::{build_link, strip_content_ext_posix};
use crate::prepare::PreparedFile;

/// One declared navigation node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavNode {
    /// Section heading label.
    pub text: Option<String>,
    /// Path this node directly represents.
    pub link: Option<String>,
    /// Path prefix applied to this node's and descendants' links,
    /// inherited from the nearest ancestor unless overridden.
    pub base: Option<String>,
    pub items: Vec<NavNode>,
}

/// The navigation declaration, either a flat ordered list or a mapping from
/// path-prefix keys to lists (each key acting as its group's base).
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Items(Vec<NavNode>),
    ByBase(Vec<(String, Vec<NavNode>)>),
}

impl Navigation {
    /// Flatten to an ordered top-level node list. Keyed groups keep
    /// declaration order, with the key injected as each node's base unless
    /// the node carries its own.
    pub fn flatten(&self) -> Vec<NavNode> {
        match self {
            Navigation::Items(items) => items.clone(),
            Navigation::ByBase(groups) => groups
                .iter()
                .flat_map(|(key, nodes)| {
                    nodes.iter().map(|node| {
                        let mut node = node.clone();
                        if node.base.is_none() {
                            node.base = Some(key.clone());
                        }
                        node
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TocOptions<'a> {
    pub domain: Option<&'a str>,
    pub navigation: Option<&'a Navigation>,
    /// Served link extension, `.md` unless overridden.
    pub link_extension: Option<&'a str>,
    pub clean_urls: bool,
    /// Site-wide base path prepended to every emitted link.
    pub base: Option<&'a str>,
    /// Restrict output to files under one subtree.
    pub directory_filter: Option<&'a str>,
}

/// Render the table of contents for a (title-sorted) file set.
pub fn generate_toc(files: &[PreparedFile], options: &TocOptions) -> String {
    let scoped: Vec<&PreparedFile> = match options.directory_filter {
        Some(dir) if dir != "." => {
            let prefix = format!("{dir}/");
            files
                .iter()
                .filter(|f| f.path == dir || f.path.starts_with(&prefix))
                .collect()
        }
        _ => files.iter().collect(),
    };

    let flattened = options.navigation.map(Navigation::flatten).unwrap_or_default();
    let usable = flattened
        .iter()
        .any(|n| n.link.is_some() || !n.items.is_empty());
    if !usable {
        return flat_listing(&scoped, options);
    }

    let mut declared = Vec::new();
    let mut sections: Vec<String> = flattened
        .iter()
        .filter_map(|node| render_section(node, &scoped, None, 3, options, &mut declared))
        .collect();

    let unmatched: Vec<&PreparedFile> = scoped
        .iter()
        .copied()
        .filter(|f| {
            let normalized = normalize_link_path(&f.path);
            !declared.iter().any(|d| paths_equivalent(d, &normalized))
        })
        .collect();
    if !unmatched.is_empty() {
        let links: String = unmatched.iter().map(|f| link_line(f, options)).collect();
        sections.push(format!("### Other\n\n{links}"));
    }

    sections.join("\n")
}

fn flat_listing(files: &[&PreparedFile], options: &TocOptions) -> String {
    files.iter().map(|f| link_line(f, options)).collect()
}

/// Render one navigation section at the given heading depth. Returns `None`
/// when the section resolves to no links and no non-empty subsections.
fn render_section(
    node: &NavNode,
    files: &[&PreparedFile],
    inherited_base: Option<&str>,
    depth: usize,
    options: &TocOptions,
    declared: &mut Vec<String>,
) -> Option<String> {
    let base = node.base.as_deref().or(inherited_base);

    let mut links = String::new();
    let mut subsections: Vec<String> = Vec::new();

    // A node's own link renders in its parent's list, never at the top of
    // its own section; here it only claims the file so the Other bucket
    // skips it.
    if let Some(link) = &node.link {
        declared.push(normalize_link_path(&compose_base(base, link)));
    }

    for child in &node.items {
        if let Some(link) = &child.link {
            let child_base = child.base.as_deref().or(base);
            if let Some(line) = resolve_link(link, child_base, files, options, declared) {
                links.push_str(&line);
            }
        }
        if !child.items.is_empty() {
            let child_base = child.base.as_deref().or(base);
            if let Some(sub) =
                render_section(child, files, child_base, depth + 1, options, declared)
            {
                subsections.push(sub);
            }
        }
    }

    let mut parts = Vec::new();
    if !links.is_empty() {
        parts.push(links);
    }
    if !subsections.is_empty() {
        parts.push(subsections.join("\n"));
    }
    if parts.is_empty() {
        return None;
    }
    let body = parts.join("\n");

    match &node.text {
        Some(text) => Some(format!("{} {text}\n\n{body}", "#".repeat(depth))),
        None => Some(body),
    }
}

/// Match one declared link against the file set; declaration order decides
/// output order, so the link renders here rather than in file order.
fn resolve_link(
    link: &str,
    base: Option<&str>,
    files: &[&PreparedFile],
    options: &TocOptions,
    declared: &mut Vec<String>,
) -> Option<String> {
    let effective = compose_base(base, link);
    let normalized = normalize_link_path(&effective);
    declared.push(normalized.clone());

    files
        .iter()
        .find(|f| paths_equivalent(&normalize_link_path(&f.path), &normalized))
        .map(|f| link_line(f, options))
}

fn link_line(file: &PreparedFile, options: &TocOptions) -> String {
    let url = build_link(
        &strip_content_ext_posix(&file.path),
        options.domain,
        Some(options.link_extension.unwrap_or(".md")),
        options.clean_urls,
        options.base,
    );
    match file.description() {
        Some(description) => format!("- [{}]({url}): {description}\n", file.title),
        None => format!("- [{}]({url})\n", file.title),
    }
}

fn compose_base(base: Option<&str>, link: &str) -> String {
    match base {
        Some(base) if !base.is_empty() => {
            format!("{}/{}", base.trim_end_matches('/'), link.trim_start_matches('/'))
        }
        _ => link.to_string(),
    }
}

/// Normalize a declared link or a file path for comparison: posix form,
/// content extension stripped, no surrounding slashes, trailing `index`
/// collapsed away.
fn normalize_link_path(path: &str) -> String {
    let stripped = strip_content_ext_posix(path);
    let trimmed = stripped.trim_start_matches('/').trim_end_matches('/');
    let collapsed = trimmed.strip_suffix("/index").unwrap_or(trimmed);
    if collapsed == "index" {
        String::new()
    } else {
        collapsed.to_string()
    }
}

/// Equality with tolerance for one side still carrying a `.md` extension.
fn paths_equivalent(a: &str, b: &str) -> bool {
    a == b || format!("{a}.md") == b || format!("{b}.md") == a
}
