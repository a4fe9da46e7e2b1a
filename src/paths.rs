//! Path and link utilities shared by the TOC synthesizer and generators.
//!
//! All public-facing links are re-derived from a file's output-relative path
//! at emission time — nothing stores a finished URL. That keeps one source
//! of truth for the extension / clean-url policy and makes these helpers
//! safe to apply repeatedly: [`strip_content_ext`] only removes an extension
//! it recognizes as a content extension, so a path that already round-tripped
//! through it (or an image path) passes through unchanged.

use crate::template::{TemplateVariables, expand_template};

/// Extensions eligible for stripping when deriving a public path.
///
/// Anything else (images, archives) keeps its extension so a second pass
/// cannot mangle it.
const CONTENT_EXTENSIONS: &[&str] = &["md", "html"];

/// Split a path into its directory and file components.
///
/// `"docs/guide.md"` → `("docs", "guide.md")`; a bare filename gets an
/// empty directory.
pub fn split_dir_and_file(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", path),
    }
}

/// Strip the file extension, but only if it is a content extension.
pub fn strip_content_ext(path: &str) -> String {
    let (dir, file) = split_dir_and_file(path);

    let base = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && CONTENT_EXTENSIONS.contains(&ext) => stem,
        _ => file,
    };

    if dir.is_empty() {
        base.to_string()
    } else {
        format!("{dir}/{base}")
    }
}

/// [`strip_content_ext`] on the POSIX form of the path.
pub fn strip_content_ext_posix(path: &str) -> String {
    strip_content_ext(&to_posix(path))
}

/// Replace backslash separators with forward slashes.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Build a public URL from an output-relative path.
///
/// Concatenates `domain + "/" + base + path + extension`. When `domain` is
/// absent the result is root-relative. `base` is normalized to carry no
/// leading slash and exactly one trailing slash. Under clean URLs the
/// extension is dropped entirely.
pub fn build_link(
    url_path: &str,
    domain: Option<&str>,
    extension: Option<&str>,
    clean_urls: bool,
    base: Option<&str>,
) -> String {
    let normalized_base = base.filter(|b| !b.is_empty()).map(|b| {
        let b = b.strip_prefix('/').unwrap_or(b);
        if b.ends_with('/') {
            b.to_string()
        } else {
            format!("{b}/")
        }
    });

    let mut vars = TemplateVariables::new();
    vars.set("domain", domain.map(str::to_string));
    vars.set("base", normalized_base);
    vars.set("path", Some(to_posix(url_path)));
    vars.set(
        "extension",
        if clean_urls {
            None
        } else {
            extension.map(str::to_string)
        },
    );

    expand_template("{domain}/{base}{path}{extension}", &vars)
}

/// Clean a URL of its query string, fragment, trailing slash, and a
/// trailing `.html` extension.
///
/// The extension is stripped from the final path segment only when the last
/// `.` occurs after the last `/`, so dots belonging to a directory name (or
/// the domain) are never touched.
pub fn clean_url(url: &str) -> String {
    let mut cleaned = url.split(['?', '#']).next().unwrap_or(url).to_string();

    if cleaned.len() > 1 && cleaned.ends_with('/') {
        cleaned.pop();
    }

    // For protocol-full URLs, only the path part may lose its extension.
    if let Some(scheme_end) = find_scheme_end(&cleaned) {
        match cleaned[scheme_end..].find('/') {
            Some(rel) => {
                let path_start = scheme_end + rel;
                let path = strip_html_ext(&cleaned[path_start..]);
                format!("{}{}", &cleaned[..path_start], path)
            }
            None => cleaned,
        }
    } else {
        strip_html_ext(&cleaned)
    }
}

/// Length of a leading `scheme://` prefix, if present.
fn find_scheme_end(url: &str) -> Option<usize> {
    let pos = url.find("://")?;
    let scheme = &url[..pos];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(pos + 3)
    } else {
        None
    }
}

fn strip_html_ext(segment: &str) -> String {
    let last_slash = segment.rfind('/');
    let last_dot = segment.rfind('.');

    match (last_dot, last_slash) {
        (Some(dot), slash) if slash.is_none_or(|s| dot > s) && segment.ends_with(".html") => {
            segment[..dot].to_string()
        }
        _ => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_extension() {
        assert_eq!(strip_content_ext("docs/guide.md"), "docs/guide");
    }

    #[test]
    fn strips_html_extension() {
        assert_eq!(strip_content_ext("docs/page.html"), "docs/page");
    }

    #[test]
    fn leaves_non_content_extensions() {
        assert_eq!(strip_content_ext("img/logo.png"), "img/logo.png");
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip_content_ext("docs/guide.md");
        assert_eq!(strip_content_ext(&once), once);
    }

    #[test]
    fn strips_bare_filename() {
        assert_eq!(strip_content_ext("index.md"), "index");
    }

    #[test]
    fn dotfile_is_untouched() {
        assert_eq!(strip_content_ext(".md"), ".md");
    }

    #[test]
    fn posix_variant_normalizes_separators() {
        assert_eq!(strip_content_ext_posix("docs\\guide.md"), "docs/guide");
    }

    #[test]
    fn to_posix_replaces_backslashes() {
        assert_eq!(to_posix("foo\\bar\\baz.md"), "foo/bar/baz.md");
    }

    #[test]
    fn link_with_domain_and_extension() {
        assert_eq!(
            build_link("docs/guide", Some("https://example.com"), Some(".md"), false, None),
            "https://example.com/docs/guide.md"
        );
    }

    #[test]
    fn link_clean_urls_drops_extension() {
        assert_eq!(
            build_link("docs/guide", Some("https://example.com"), Some(".md"), true, None),
            "https://example.com/docs/guide"
        );
    }

    #[test]
    fn link_without_domain_is_root_relative() {
        assert_eq!(
            build_link("test/getting-started", None, Some(".md"), false, None),
            "/test/getting-started.md"
        );
    }

    #[test]
    fn link_base_normalization() {
        assert_eq!(
            build_link("guide", None, Some(".md"), false, Some("/docs/")),
            "/docs/guide.md"
        );
        assert_eq!(
            build_link("guide", None, Some(".md"), false, Some("docs")),
            "/docs/guide.md"
        );
    }

    #[test]
    fn link_empty_base_is_ignored() {
        assert_eq!(build_link("guide", None, Some(".md"), false, Some("")), "/guide.md");
    }

    #[test]
    fn clean_url_strips_query_and_fragment() {
        assert_eq!(
            clean_url("https://example.com/docs/page.html?query=1#top"),
            "https://example.com/docs/page"
        );
    }

    #[test]
    fn clean_url_strips_trailing_slash() {
        assert_eq!(clean_url("https://example.com/docs/"), "https://example.com/docs");
    }

    #[test]
    fn clean_url_keeps_root_slash() {
        assert_eq!(clean_url("/"), "/");
    }

    #[test]
    fn clean_url_keeps_dotted_directory() {
        assert_eq!(
            clean_url("https://example.com/v1.2/guide"),
            "https://example.com/v1.2/guide"
        );
    }

    #[test]
    fn clean_url_keeps_non_html_extensions() {
        assert_eq!(clean_url("/docs/page.md"), "/docs/page.md");
    }

    #[test]
    fn clean_url_domain_only() {
        assert_eq!(clean_url("https://example.com"), "https://example.com");
    }
}
