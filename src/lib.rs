//! # llmstxt
//!
//! A static generator for [llms.txt](https://llmstxt.org/) documentation
//! artifacts. Point it at a directory of markdown, and it produces the plain
//! text files LLMs consume: an `llms.txt` index, an `llms-full.txt` bundle,
//! and per-page markdown snapshots stripped of site chrome.
//!
//! # Architecture: A Two-Stage Pipeline
//!
//! llmstxt processes content in two independent stages:
//!
//! ```text
//! 1. Prepare   docs/*.md  →  PreparedFile   (frontmatter + content normalization)
//! 2. Generate  prepared   →  dist/          (llms.txt, llms-full.txt, pages)
//! ```
//!
//! This separation exists for two reasons:
//!
//! - **Testability**: generation is a pure function from prepared files to
//!   strings, so unit tests can exercise output logic without touching the
//!   filesystem.
//! - **Check mode**: `llmstxt check` runs the prepare stage alone to validate
//!   a docs tree without writing anything.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Orchestration — discovery, parallel preparation, artifact writing |
//! | [`prepare`] | Per-file normalization: frontmatter, tag processing, path rewrites |
//! | [`markdown`] | Markdown parsing into a block tree and rendering back to text |
//! | [`transform`] | Tree transforms: tag removal/unwrapping, HTML stripping, includes |
//! | [`generate`] | Artifact assembly: llms.txt template expansion, bundles, pages |
//! | [`toc`] | Table of contents generation, flat or navigation-driven |
//! | [`rewrites`] | Route rewrite rules with `:param` and `*wildcard` patterns |
//! | [`depth`] | Directory enumeration for per-directory artifact sets |
//! | [`template`] | `{variable}` template expansion with fallbacks |
//! | [`paths`] | Link building, extension handling, URL normalization |
//! | [`config`] | `llmstxt.toml` loading and validation |
//! | [`output`] | CLI output formatting for build and check reports |
//!
//! # Design Decisions
//!
//! ## A Real Markdown Tree, Not Regex Surgery
//!
//! Content transforms operate on a block tree parsed with
//! [pulldown-cmark](https://docs.rs/pulldown-cmark), not on raw text. Removing
//! a `<llm-exclude>` region or stripping HTML requires knowing where elements
//! begin and end, and markdown's interleaving of HTML blocks and inline HTML
//! makes that unreliable with string matching alone. It also keeps code
//! fences opaque: a marker tag quoted inside a fence is content, not markup.
//! The two raw-text escape hatches ([`transform::unwrap_tag_raw`] and
//! [`transform::remove_tag_raw`]) exist for callers working on text that
//! never gets parsed; the preparation pipeline itself stays on the tree.
//!
//! ## Filesystem In, Filesystem Out
//!
//! There is no server, no watch mode, and no plugin host. The tool reads a
//! docs directory and writes a dist directory, which makes it trivial to slot
//! into any build: run it after your site generator, or on its own.
//!
//! ## One Flat Config File
//!
//! All behavior is driven by a single `llmstxt.toml` at the project root.
//! `llmstxt gen-config` prints a fully documented stock config to start from.

pub mod config;
pub mod depth;
pub mod generate;
pub mod markdown;
pub mod output;
pub mod paths;
pub mod prepare;
pub mod rewrites;
pub mod session;
pub mod template;
pub mod toc;
pub mod transform;
