//! Build configuration module.
//!
//! Handles loading and validating `llmstxt.toml`. All settings are optional;
//! a missing config file means a default build of the `docs` directory.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! work_dir = "docs"         # Markdown source root
//! out_dir = "dist"          # Where artifacts are written
//! # domain = "https://example.com"  # Absolute-URL prefix for links
//! # base = "/"              # Site base path prepended to links
//! clean_urls = false        # Emit links without file extensions
//! strip_html = true         # Drop raw HTML from generated text
//! depth = 1                 # Directory depth for per-directory artifacts
//! ignore = []               # Extra glob patterns to skip
//!
//! # title = "My Project"    # Override the {title} variable
//! # description = "..."     # Override {description}
//! # details = "..."         # Override {details}
//! # toc = "..."             # Override {toc}
//! # template = "..."        # Inline llms.txt template
//! # template_file = "llms-template.md"
//!
//! [artifacts]
//! llms_txt = true           # Generate llms.txt
//! llms_full_txt = true      # Generate llms-full.txt
//! pages = true              # Generate per-page .md mirrors
//!
//! [excludes]                # Stock skip-list toggles
//! blog = true               # blog/*, blog.md
//! team = true               # team.md
//! readme = true             # README.md
//! index = false             # index.md (kept: it feeds title/description)
//!
//! [site]                    # Site-wide metadata fallbacks
//! # title = "My Project"
//! # title_template = ":title | My Project"
//! # description = "..."
//!
//! [template_variables]      # Custom {key} values
//! # maintainer = "docs team"
//!
//! [rewrites]                # Output path rewrites, tried in order
//! # "docs/guide/index.md" = "guide.md"
//! # "packages/:pkg/README.md" = ":pkg.md"
//!
//! # [[nav]]                 # Declared navigation (array form)
//! # text = "Guide"
//! #   [[nav.items]]
//! #   link = "/guide/intro"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::toc::{NavNode, Navigation};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `llmstxt.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Markdown source root, relative to the config file.
    pub work_dir: String,
    /// Output directory for generated artifacts.
    pub out_dir: String,
    /// Absolute-URL prefix (`https://example.com`); links are root-relative
    /// when absent.
    pub domain: Option<String>,
    /// Site base path prepended to every emitted link.
    pub base: Option<String>,
    /// Emit links without file extensions.
    pub clean_urls: bool,
    /// Drop raw HTML nodes from generated text.
    pub strip_html: bool,
    /// Directory depth at which separate `llms.txt`/`llms-full.txt` pairs
    /// are emitted; 1 means root only.
    pub depth: usize,
    /// Extra glob patterns to skip during discovery.
    pub ignore: Vec<String>,
    /// Override for the `{title}` template variable.
    pub title: Option<String>,
    /// Override for `{description}`.
    pub description: Option<String>,
    /// Override for `{details}`.
    pub details: Option<String>,
    /// Override for `{toc}`.
    pub toc: Option<String>,
    /// Inline llms.txt template.
    pub template: Option<String>,
    /// Path to a template file, relative to the config file.
    pub template_file: Option<String>,
    /// Which artifacts to generate.
    pub artifacts: ArtifactsConfig,
    /// Stock skip-list toggles.
    pub excludes: ExcludesConfig,
    /// Site-wide metadata fallbacks for the index document.
    pub site: SiteSection,
    /// Custom `{key}` template values, expanded in declaration order.
    pub template_variables: toml::Table,
    /// Output path rewrites, tried in declaration order.
    pub rewrites: toml::Table,
    /// Declared navigation: an array of nodes, or a table keyed by path
    /// prefix.
    pub nav: Option<toml::Value>,
}

fn default_work_dir() -> String {
    "docs".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            out_dir: default_out_dir(),
            domain: None,
            base: None,
            clean_urls: false,
            strip_html: true,
            depth: 1,
            ignore: Vec::new(),
            title: None,
            description: None,
            details: None,
            toc: None,
            template: None,
            template_file: None,
            artifacts: ArtifactsConfig::default(),
            excludes: ExcludesConfig::default(),
            site: SiteSection::default(),
            template_variables: toml::Table::new(),
            rewrites: toml::Table::new(),
            nav: None,
        }
    }
}

/// Which artifacts to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactsConfig {
    pub llms_txt: bool,
    pub llms_full_txt: bool,
    /// Per-page `.md` mirrors of every source document.
    pub pages: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self { llms_txt: true, llms_full_txt: true, pages: true }
    }
}

/// Toggles for the stock skip list. Each adds its glob patterns to the
/// effective ignore set when enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludesConfig {
    /// `blog/*` and `blog.md`.
    pub blog: bool,
    /// `team.md`.
    pub team: bool,
    /// `README.md`.
    pub readme: bool,
    /// `index.md`. Off by default: the landing page feeds the generated
    /// title and description.
    pub index: bool,
}

impl Default for ExcludesConfig {
    fn default() -> Self {
        Self { blog: true, team: true, readme: true, index: false }
    }
}

/// Site-wide metadata used as mid-chain fallbacks when assembling the index
/// document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: Option<String>,
    pub title_template: Option<String>,
    pub description: Option<String>,
}

impl BuildConfig {
    /// Validate config values and the shapes of the free-form tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::Validation("depth must be at least 1".into()));
        }
        if self.template.is_some() && self.template_file.is_some() {
            return Err(ConfigError::Validation(
                "template and template_file are mutually exclusive".into(),
            ));
        }
        for (key, value) in &self.template_variables {
            if !value.is_str() {
                return Err(ConfigError::Validation(format!(
                    "template_variables.{key} must be a string"
                )));
            }
        }
        for (key, value) in &self.rewrites {
            if !value.is_str() {
                return Err(ConfigError::Validation(format!(
                    "rewrites.\"{key}\" must be a string"
                )));
            }
        }
        self.navigation()?;
        Ok(())
    }

    /// Effective ignore patterns: user globs plus the enabled stock skips.
    pub fn ignore_patterns(&self) -> Vec<String> {
        let mut patterns = self.ignore.clone();
        if self.excludes.blog {
            patterns.push("blog/*".to_string());
            patterns.push("blog.md".to_string());
        }
        if self.excludes.team {
            patterns.push("team.md".to_string());
        }
        if self.excludes.readme {
            patterns.push("README.md".to_string());
        }
        if self.excludes.index {
            patterns.push("index.md".to_string());
        }
        patterns
    }

    /// Served link extension: `.md` while page mirrors exist, `.html`
    /// otherwise.
    pub fn link_extension(&self) -> &'static str {
        if self.artifacts.pages { ".md" } else { ".html" }
    }

    /// Rewrite rules in declaration order.
    pub fn route_rewrites(&self) -> Vec<(String, String)> {
        self.rewrites
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    /// Custom template variables in declaration order.
    pub fn custom_variables(&self) -> Vec<(String, String)> {
        self.template_variables
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    /// Interpret the `nav` value: an array is the flat form, a table is the
    /// keyed-by-path-prefix form (declaration order preserved).
    pub fn navigation(&self) -> Result<Option<Navigation>, ConfigError> {
        let Some(value) = &self.nav else {
            return Ok(None);
        };
        match value {
            toml::Value::Array(_) => {
                let nodes: Vec<NavNode> = value.clone().try_into().map_err(|e| {
                    ConfigError::Validation(format!("invalid nav entry: {e}"))
                })?;
                Ok(Some(Navigation::Items(nodes)))
            }
            toml::Value::Table(table) => {
                let mut groups = Vec::with_capacity(table.len());
                for (key, group) in table {
                    let nodes: Vec<NavNode> = group.clone().try_into().map_err(|e| {
                        ConfigError::Validation(format!("invalid nav.\"{key}\" entry: {e}"))
                    })?;
                    groups.push((key.clone(), nodes));
                }
                Ok(Some(Navigation::ByBase(groups)))
            }
            _ => Err(ConfigError::Validation(
                "nav must be an array of nodes or a table of path prefixes".into(),
            )),
        }
    }

    /// The llms.txt template override, reading `template_file` when set.
    pub fn resolved_template(&self, root: &Path) -> Result<Option<String>, ConfigError> {
        if let Some(template) = &self.template {
            return Ok(Some(template.clone()));
        }
        match &self.template_file {
            Some(file) => Ok(Some(fs::read_to_string(root.join(file))?)),
            None => Ok(None),
        }
    }
}

/// Load config from `llmstxt.toml` in the given directory.
///
/// A missing file yields the defaults. Unknown keys are rejected and the
/// result is validated.
pub fn load_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    let config_path = root.join("llmstxt.toml");
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        BuildConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `llmstxt.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# llmstxt Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Markdown source root, relative to this file.
work_dir = "docs"

# Output directory for generated artifacts.
out_dir = "dist"

# Absolute-URL prefix for links. Omit for root-relative links.
# domain = "https://example.com"

# Site base path prepended to every emitted link.
# base = "/"

# Emit links without file extensions (server resolves them).
clean_urls = false

# Drop raw HTML from the generated text.
strip_html = true

# Directory depth at which separate llms.txt/llms-full.txt pairs are
# emitted. 1 = root only, 2 = root plus immediate subdirectories.
depth = 1

# Extra glob patterns to skip during discovery.
ignore = []

# Overrides for the standard template variables. Each short-circuits its
# defaulting chain entirely.
# title = "My Project"
# description = "A fine documentation site"
# details = "Hand-curated details line"

# Custom llms.txt template, inline or from a file. The default template is:
#   # {title}
#
#   {description}
#
#   {details}
#
#   ## Table of Contents
#
#   {toc}
# template = ""
# template_file = "llms-template.md"

# ---------------------------------------------------------------------------
# Artifacts
# ---------------------------------------------------------------------------
[artifacts]
llms_txt = true
llms_full_txt = true
pages = true

# ---------------------------------------------------------------------------
# Stock skip list
# ---------------------------------------------------------------------------
[excludes]
blog = true      # blog/*, blog.md
team = true      # team.md
readme = true    # README.md
index = false    # index.md feeds the generated title/description

# ---------------------------------------------------------------------------
# Site metadata fallbacks
# ---------------------------------------------------------------------------
[site]
# title = "My Project"
# title_template = ":title | My Project"
# description = "A fine documentation site"

# ---------------------------------------------------------------------------
# Custom template variables, expanded in declaration order
# ---------------------------------------------------------------------------
[template_variables]
# maintainer = "docs team"

# ---------------------------------------------------------------------------
# Output path rewrites, tried in declaration order.
# Patterns support :param (one segment) and a trailing *wildcard.
# ---------------------------------------------------------------------------
[rewrites]
# "docs/guide/index.md" = "guide.md"
# "packages/:pkg/README.md" = ":pkg.md"

# ---------------------------------------------------------------------------
# Declared navigation. Array form:
#
# [[nav]]
# text = "Guide"
#   [[nav.items]]
#   link = "/guide/intro"
#
# Keyed form (each key acts as its group's base):
#
# [[nav."/guide/"]]
# text = "Guide"
#   [[nav."/guide/".items]]
#   link = "intro"
# ---------------------------------------------------------------------------
"##
}
