//! Artifact assembly: the `llms.txt` index document, the `llms-full.txt`
//! bundle, and per-page mirror content.
//!
//! The index document is a template expansion over four standard variables
//! (`title`, `description`, `details`, `toc`) plus any user-defined keys.
//! Each standard variable resolves through a precedence chain where an
//! explicit override always wins outright and defaulting only fills gaps.

use serde_yaml::Mapping;

use crate::paths::{build_link, strip_content_ext_posix};
use crate::prepare::{frontmatter_str, PreparedFile};
use crate::template::{expand_template, TemplateVariables};
use crate::toc::{generate_toc, TocOptions};

/// Template recognized by llmstxt.org consumers.
pub const DEFAULT_TEMPLATE: &str =
    "# {title}\n\n{description}\n\n{details}\n\n## Table of Contents\n\n{toc}";

const GENERIC_DETAILS: &str = "This file contains links to all documentation sections.";

/// Site-wide metadata used as mid-chain fallbacks for the index document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteInfo {
    pub title: Option<String>,
    pub title_template: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LlmsTxtOptions<'a> {
    /// Explicit overrides for the standard variables; each short-circuits
    /// its whole defaulting chain.
    pub title: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub toc: Option<String>,
    /// Custom template, [`DEFAULT_TEMPLATE`] when absent.
    pub template: Option<&'a str>,
    /// User-defined `{key}` values, applied after the standard four.
    pub custom_variables: Vec<(String, String)>,
    pub site: SiteInfo,
    pub toc_options: TocOptions<'a>,
}

/// Assemble the index document from the prepared file set.
pub fn generate_llms_txt(files: &[PreparedFile], options: &LlmsTxtOptions) -> String {
    let index = files.iter().find(|f| f.path == "index.md");

    let title = non_empty(options.title.clone())
        .or_else(|| index.and_then(|f| frontmatter_field(f, "hero.name")))
        .or_else(|| index.and_then(|f| frontmatter_field(f, "title")))
        .or_else(|| non_empty(options.site.title.clone()))
        .or_else(|| non_empty(options.site.title_template.clone()))
        .or_else(|| index.map(|f| f.title.clone()))
        .unwrap_or_else(|| "LLMs Documentation".to_string());

    let description = non_empty(options.description.clone())
        .or_else(|| index.and_then(|f| frontmatter_field(f, "hero.text")))
        .or_else(|| non_empty(options.site.description.clone()))
        .or_else(|| index.and_then(|f| frontmatter_field(f, "description")))
        .or_else(|| index.and_then(|f| frontmatter_field(f, "titleTemplate")));

    let details = non_empty(options.details.clone())
        .or_else(|| index.and_then(|f| frontmatter_field(f, "hero.tagline")))
        .or_else(|| index.and_then(|f| frontmatter_field(f, "tagline")))
        .or_else(|| {
            // The generic sentence stands in for details only when no
            // description resolved either, so the document never opens with
            // two stock lines.
            if description.is_none() {
                Some(GENERIC_DETAILS.to_string())
            } else {
                None
            }
        });

    let toc = non_empty(options.toc.clone())
        .unwrap_or_else(|| generate_toc(files, &options.toc_options));

    let mut variables = TemplateVariables::new();
    variables.set("title", Some(title));
    variables.set("description", description.map(|d| format!("> {d}")));
    variables.set("details", details);
    variables.set("toc", Some(toc));
    for (key, value) in &options.custom_variables {
        variables.set(key, Some(value.clone()));
    }

    expand_template(options.template.unwrap_or(DEFAULT_TEMPLATE), &variables)
}

#[derive(Debug, Clone, Default)]
pub struct FullTxtOptions<'a> {
    pub domain: Option<&'a str>,
    pub link_extension: Option<&'a str>,
    pub clean_urls: bool,
    pub base: Option<&'a str>,
    pub directory_filter: Option<&'a str>,
}

/// Concatenate all (optionally scoped) documents into the full-text bundle.
pub fn generate_llms_full_txt(
    files: &[PreparedFile],
    options: &FullTxtOptions,
) -> Result<String, serde_yaml::Error> {
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

    let mut entries = Vec::with_capacity(scoped.len());
    for file in scoped {
        let url = build_link(
            &strip_content_ext_posix(&file.path),
            options.domain,
            Some(options.link_extension.unwrap_or(".md")),
            options.clean_urls,
            options.base,
        );
        entries.push(serialize_with_url(file, &url)?);
    }
    Ok(entries.join("\n---\n\n"))
}

#[derive(Debug, Clone, Default)]
pub struct PageOptions<'a> {
    pub domain: Option<&'a str>,
    pub clean_urls: bool,
    pub base: Option<&'a str>,
}

/// Mirror content for a single page: minimal frontmatter (`url`, optional
/// `description`) plus the transformed body.
pub fn page_content(
    file: &PreparedFile,
    options: &PageOptions,
) -> Result<String, serde_yaml::Error> {
    let url = build_link(
        &strip_content_ext_posix(&file.path),
        options.domain,
        Some(".md"),
        options.clean_urls,
        options.base,
    );
    serialize_with_url(file, &url)
}

fn serialize_with_url(file: &PreparedFile, url: &str) -> Result<String, serde_yaml::Error> {
    let mut frontmatter = Mapping::new();
    frontmatter.insert("url".into(), url.into());
    if let Some(description) = file.description() {
        frontmatter.insert("description".into(), description.into());
    }
    let yaml = serde_yaml::to_string(&frontmatter)?;
    Ok(format!("---\n{yaml}---\n\n{}", file.content))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn frontmatter_field(file: &PreparedFile, dotted: &str) -> Option<String> {
    non_empty(frontmatter_str(&file.frontmatter, dotted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepare::{prepare, PrepareOptions};

    fn prepared(raw: &str, path: &str) -> PreparedFile {
        prepare(raw, path, &PrepareOptions::default()).unwrap()
    }

    #[test]
    fn index_title_prefers_hero_name() {
        let files = vec![prepared(
            "---\ntitle: Plain\nhero:\n  name: Hero Name\n---\n# H1\n",
            "index.md",
        )];
        let out = generate_llms_txt(&files, &LlmsTxtOptions::default());
        assert!(out.starts_with("# Hero Name\n"));
    }

    #[test]
    fn title_override_wins_over_everything() {
        let files = vec![prepared("---\nhero:\n  name: Hero\n---\nx\n", "index.md")];
        let options = LlmsTxtOptions { title: Some("Forced".to_string()), ..Default::default() };
        assert!(generate_llms_txt(&files, &options).starts_with("# Forced\n"));
    }

    #[test]
    fn title_falls_back_to_site_then_literal() {
        let files = vec![prepared("x\n", "other.md")];
        let options = LlmsTxtOptions {
            site: SiteInfo { title: Some("Site Title".to_string()), ..Default::default() },
            ..Default::default()
        };
        assert!(generate_llms_txt(&files, &options).starts_with("# Site Title\n"));

        assert!(
            generate_llms_txt(&files, &LlmsTxtOptions::default())
                .starts_with("# LLMs Documentation\n")
        );
    }

    #[test]
    fn description_gets_blockquote_prefix() {
        let files = vec![prepared("---\nhero:\n  text: A helpful site\n---\nx\n", "index.md")];
        let out = generate_llms_txt(&files, &LlmsTxtOptions::default());
        assert!(out.contains("> A helpful site\n"));
    }

    #[test]
    fn generic_details_only_without_description() {
        let files = vec![prepared("x\n", "a.md")];
        let out = generate_llms_txt(&files, &LlmsTxtOptions::default());
        assert!(out.contains(GENERIC_DETAILS));

        let described = LlmsTxtOptions {
            description: Some("Real description".to_string()),
            ..Default::default()
        };
        let out = generate_llms_txt(&files, &described);
        assert!(!out.contains(GENERIC_DETAILS));
        assert!(out.contains("> Real description"));
    }

    #[test]
    fn absent_description_leaves_no_blank_gap() {
        let files = vec![prepared("x\n", "a.md")];
        let options = LlmsTxtOptions { title: Some("T".to_string()), ..Default::default() };
        let out = generate_llms_txt(&files, &options);
        assert!(!out.contains("\n\n\n"), "unexpected stacked blank lines in {out:?}");
    }

    #[test]
    fn toc_variable_fills_from_synthesizer() {
        let files = vec![prepared("---\ntitle: Page\n---\nbody\n", "docs/page.md")];
        let out = generate_llms_txt(&files, &LlmsTxtOptions::default());
        assert!(out.contains("## Table of Contents\n\n- [Page](/docs/page.md)\n"));
    }

    #[test]
    fn custom_variables_expand_in_custom_template() {
        let files = vec![prepared("x\n", "a.md")];
        let options = LlmsTxtOptions {
            template: Some("# {title}\n\nMaintainer: {maintainer}\n"),
            title: Some("T".to_string()),
            custom_variables: vec![("maintainer".to_string(), "docs team".to_string())],
            ..Default::default()
        };
        let out = generate_llms_txt(&files, &options);
        assert_eq!(out, "# T\n\nMaintainer: docs team\n");
    }

    #[test]
    fn bundle_entries_carry_url_frontmatter() {
        let files = vec![
            prepared("---\ndescription: First\n---\nbody one\n", "one.md"),
            prepared("body two\n", "two.md"),
        ];
        let out = generate_llms_full_txt(&files, &FullTxtOptions::default()).unwrap();
        assert_eq!(
            out,
            "---\nurl: /one.md\ndescription: First\n---\n\nbody one\n\n---\n\n---\nurl: /two.md\n---\n\nbody two\n"
        );
    }

    #[test]
    fn bundle_respects_directory_filter() {
        let files = vec![
            prepared("in\n", "guide/in.md"),
            prepared("out\n", "api/out.md"),
        ];
        let options = FullTxtOptions { directory_filter: Some("guide"), ..Default::default() };
        let out = generate_llms_full_txt(&files, &options).unwrap();
        assert!(out.contains("guide/in.md"));
        assert!(!out.contains("api/out.md"));
    }

    #[test]
    fn bundle_uses_domain_for_urls() {
        let files = vec![prepared("x\n", "a.md")];
        let options =
            FullTxtOptions { domain: Some("https://docs.example.com"), ..Default::default() };
        let out = generate_llms_full_txt(&files, &options).unwrap();
        assert!(out.contains("url: https://docs.example.com/a.md\n"));
    }

    #[test]
    fn page_mirror_has_minimal_frontmatter() {
        let file = prepared(
            "---\ntitle: Kept out\ndescription: Short\nextra: dropped\n---\nThe body.\n",
            "docs/page.md",
        );
        let out = page_content(&file, &PageOptions::default()).unwrap();
        assert_eq!(out, "---\nurl: /docs/page.md\ndescription: Short\n---\n\nThe body.\n");
    }
}
