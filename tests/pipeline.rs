//! End-to-end pipeline test: a realistic docs tree with config, navigation,
//! rewrites, and processing tags, built through the public session API.

use llmstxt::config::load_config;
use llmstxt::session::BuildSession;
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "llmstxt.toml",
        r#"
work_dir = "docs"
out_dir = "dist"
domain = "https://example.com"
title = "Example Docs"
description = "Documentation for the Example project."

[rewrites]
"api/reference.md" = "api/api-reference.md"

[[nav]]
text = "Guide"
base = "/guide/"
items = [{ text = "Getting Started", link = "getting-started" }]
"#,
    );

    write(
        root,
        "docs/index.md",
        "---\ntitle: Home\ndescription: The landing page.\n---\n\n# Welcome\n\nStart here.\n",
    );
    write(
        root,
        "docs/guide/index.md",
        "# Guide\n\nAn overview of the guide section.\n",
    );
    write(
        root,
        "docs/guide/getting-started.md",
        "# Getting Started\n\n\
         <llm-only>\n\nAgents read this.\n\n</llm-only>\n\n\
         <llm-exclude>\n\nHumans read this.\n\n</llm-exclude>\n\n\
         Everyone reads this.\n",
    );
    write(
        root,
        "docs/api/reference.md",
        "---\ntitle: API Reference\n---\n\nEvery public function, documented.\n",
    );

    dir
}

#[test]
fn full_build_produces_all_artifacts() {
    let dir = project();
    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());

    let report = session.run().unwrap();
    assert_eq!(report.warnings, Vec::<String>::new());
    assert_eq!(report.prepared, 4);

    let dist = dir.path().join("dist");
    assert!(dist.join("llms.txt").is_file());
    assert!(dist.join("llms-full.txt").is_file());
    assert!(dist.join("index.md").is_file());
    assert!(dist.join("guide.md").is_file(), "guide/index.md collapses");
    assert!(dist.join("guide/getting-started.md").is_file());
}

#[test]
fn llms_txt_uses_config_metadata_and_navigation() {
    let dir = project();
    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());
    session.run().unwrap();

    let index = fs::read_to_string(dir.path().join("dist/llms.txt")).unwrap();
    assert!(index.starts_with("# Example Docs\n"));
    assert!(index.contains("> Documentation for the Example project."));
    assert!(index.contains("## Table of Contents"));
    assert!(index.contains("### Guide"));
    assert!(
        index.contains("- [Getting Started](https://example.com/guide/getting-started.md)"),
        "nav link should resolve to the prepared file:\n{index}"
    );
    // Files outside the navigation land in a trailing bucket.
    assert!(index.contains("### Other"));
    assert!(index.contains("https://example.com/api/api-reference.md"));
}

#[test]
fn rewrites_move_page_output() {
    let dir = project();
    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());
    session.run().unwrap();

    let dist = dir.path().join("dist");
    assert!(dist.join("api/api-reference.md").is_file());
    assert!(!dist.join("api/reference.md").exists());

    let bundle = fs::read_to_string(dist.join("llms-full.txt")).unwrap();
    assert!(bundle.contains("url: https://example.com/api/api-reference.md"));
}

#[test]
fn processing_tags_select_llm_content() {
    let dir = project();
    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());
    session.run().unwrap();

    let page = fs::read_to_string(
        dir.path().join("dist/guide/getting-started.md"),
    )
    .unwrap();
    assert!(page.contains("Agents read this."));
    assert!(!page.contains("Humans read this."));
    assert!(page.contains("Everyone reads this."));
}

#[test]
fn check_validates_without_writing() {
    let dir = project();
    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());

    let report = session.check().unwrap();
    assert_eq!(report.prepared, 4);
    assert!(report.artifacts.is_empty());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn broken_frontmatter_is_reported_and_skipped() {
    let dir = project();
    write(
        dir.path(),
        "docs/broken.md",
        "---\ntitle: [unclosed\n---\n\nBody.\n",
    );

    let config = load_config(dir.path()).unwrap();
    let session = BuildSession::new(config, dir.path().to_path_buf());
    let report = session.run().unwrap();

    assert_eq!(report.prepared, 4);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("broken.md"));
    assert!(!dir.path().join("dist/broken.md").exists());
}
