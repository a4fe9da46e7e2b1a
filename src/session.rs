//! Build session: one pass from source discovery to written artifacts.
//!
//! The session owns the resolved configuration and the filesystem edges of
//! the pipeline. Per-file failures (unreadable source, broken frontmatter,
//! failed page write) become report warnings and the build continues; only
//! environment-level failures (missing work dir, unwritable output root)
//! abort it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::{BuildConfig, ConfigError};
use crate::depth::directories_at_depths;
use crate::generate::{
    generate_llms_full_txt, generate_llms_txt, page_content, FullTxtOptions, LlmsTxtOptions,
    PageOptions, SiteInfo,
};
use crate::paths::to_posix;
use crate::prepare::{prepare, PrepareOptions, PreparedFile};
use crate::toc::TocOptions;

const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("work directory not found: {}", .0.display())]
    MissingWorkDir(PathBuf),
}

/// One written artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: String,
    pub bytes: usize,
}

/// Outcome of a build or check pass.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<String>,
    /// Number of source documents that prepared successfully.
    pub prepared: usize,
}

/// Everything discovery found under the work directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Markdown sources, work-dir-relative, posix separators.
    pub sources: Vec<String>,
    /// Image basename to work-dir-relative path.
    pub assets: HashMap<String, String>,
}

pub struct BuildSession {
    config: BuildConfig,
    root: PathBuf,
}

impl BuildSession {
    pub fn new(config: BuildConfig, root: PathBuf) -> Self {
        Self { config, root }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join(&self.config.work_dir)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.out_dir)
    }

    /// Walk the work directory for Markdown sources and emitted assets.
    /// Hidden entries and anything matching an ignore pattern are skipped.
    pub fn discover(&self) -> Result<Discovery, SessionError> {
        let work_dir = self.work_dir();
        if !work_dir.is_dir() {
            return Err(SessionError::MissingWorkDir(work_dir));
        }

        let ignore: Vec<Pattern> = self
            .config
            .ignore_patterns()
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<_, _>>()?;

        let mut discovery = Discovery::default();
        let walker = WalkDir::new(&work_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e.path()));

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = match entry.path().strip_prefix(&work_dir) {
                Ok(rel) => to_posix(&rel.to_string_lossy()),
                Err(_) => continue,
            };

            let extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();

            if extension == "md" {
                if !ignore.iter().any(|p| p.matches(&relative)) {
                    discovery.sources.push(relative);
                }
            } else if ASSET_EXTENSIONS.contains(&extension.as_str()) {
                let basename = relative.rsplit('/').next().unwrap_or(&relative).to_string();
                discovery.assets.entry(basename).or_insert(relative);
            }
        }

        Ok(discovery)
    }

    /// Discover and prepare only; nothing is written. Used by `check`.
    pub fn check(&self) -> Result<BuildReport, SessionError> {
        let discovery = self.discover()?;
        let mut report = BuildReport::default();
        let files = self.prepare_all(&discovery, &mut report);
        report.prepared = files.len();
        Ok(report)
    }

    /// Full pipeline: discover, prepare, generate, write.
    pub fn run(&self) -> Result<BuildReport, SessionError> {
        let mut report = BuildReport::default();

        let discovery = self.discover()?;
        if discovery.sources.is_empty() {
            report.warnings.push(format!(
                "no markdown files found under {}, nothing to generate",
                self.work_dir().display()
            ));
            return Ok(report);
        }

        let mut files = self.prepare_all(&discovery, &mut report);
        report.prepared = files.len();
        if files.is_empty() {
            report
                .warnings
                .push("every discovered file failed to prepare, nothing to generate".to_string());
            return Ok(report);
        }

        // Stable presentation order for flat listings and the bundle.
        files.sort_by(|a, b| {
            (a.title.to_lowercase(), &a.title).cmp(&(b.title.to_lowercase(), &b.title))
        });

        let navigation = self.config.navigation()?;
        let template = self.config.resolved_template(&self.root)?;

        let source_paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        let directories = directories_at_depths(&source_paths, self.config.depth);

        let out_dir = self.out_dir();
        for directory in &directories {
            let filter = directory.relative_path.as_str();
            let target = if filter == "." {
                out_dir.clone()
            } else {
                out_dir.join(filter)
            };

            if self.config.artifacts.llms_txt {
                let options = LlmsTxtOptions {
                    title: self.config.title.clone(),
                    description: self.config.description.clone(),
                    details: self.config.details.clone(),
                    toc: self.config.toc.clone(),
                    template: template.as_deref(),
                    custom_variables: self.config.custom_variables(),
                    site: SiteInfo {
                        title: self.config.site.title.clone(),
                        title_template: self.config.site.title_template.clone(),
                        description: self.config.site.description.clone(),
                    },
                    toc_options: TocOptions {
                        domain: self.config.domain.as_deref(),
                        navigation: navigation.as_ref(),
                        link_extension: Some(self.config.link_extension()),
                        clean_urls: self.config.clean_urls,
                        base: self.config.base.as_deref(),
                        directory_filter: Some(filter),
                    },
                };
                let content = generate_llms_txt(&files, &options);
                self.write_artifact(&target.join("llms.txt"), &content, &mut report)?;
            }

            if self.config.artifacts.llms_full_txt {
                let options = FullTxtOptions {
                    domain: self.config.domain.as_deref(),
                    link_extension: Some(self.config.link_extension()),
                    clean_urls: self.config.clean_urls,
                    base: self.config.base.as_deref(),
                    directory_filter: Some(filter),
                };
                let content = generate_llms_full_txt(&files, &options)?;
                self.write_artifact(&target.join("llms-full.txt"), &content, &mut report)?;
            }
        }

        if self.config.artifacts.pages {
            let options = PageOptions {
                domain: self.config.domain.as_deref(),
                clean_urls: self.config.clean_urls,
                base: self.config.base.as_deref(),
            };
            for file in &files {
                let content = page_content(file, &options)?;
                let target = out_dir.join(&file.path);
                if let Err(error) = write_file(&target, &content) {
                    report
                        .warnings
                        .push(format!("failed to write {}: {error}", file.path));
                    continue;
                }
                report.artifacts.push(Artifact { path: file.path.clone(), bytes: content.len() });
            }
        }

        Ok(report)
    }

    fn prepare_all(&self, discovery: &Discovery, report: &mut BuildReport) -> Vec<PreparedFile> {
        let work_dir = self.work_dir();
        let options = PrepareOptions {
            rewrites: self.config.route_rewrites(),
            strip_html: self.config.strip_html,
            assets: discovery.assets.clone(),
        };

        let results: Vec<Result<PreparedFile, String>> = discovery
            .sources
            .par_iter()
            .map(|relative| {
                let raw = fs::read_to_string(work_dir.join(relative))
                    .map_err(|e| format!("failed to read {relative}: {e}"))?;
                prepare(&raw, relative, &options).map_err(|e| e.to_string())
            })
            .collect();

        let mut files = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(file) => files.push(file),
                Err(warning) => report.warnings.push(format!("skipped: {warning}")),
            }
        }
        files
    }

    fn write_artifact(
        &self,
        target: &Path,
        content: &str,
        report: &mut BuildReport,
    ) -> Result<(), SessionError> {
        write_file(target, content)?;
        let display = target
            .strip_prefix(self.out_dir())
            .unwrap_or(target)
            .to_string_lossy()
            .into_owned();
        report.artifacts.push(Artifact { path: to_posix(&display), bytes: content.len() });
        Ok(())
    }
}

fn write_file(target: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') && n.len() > 1)
}
