//! Route-rewrite resolution for output paths.
//!
//! Rewrite rules map a source-relative path to a different output path.
//! A rule's pattern is either a literal path (exact match) or a dynamic
//! pattern with `:name` single-segment parameters and a trailing `*name`
//! wildcard; the replacement references captured parameters by the same
//! syntax. Rules are tried in declaration order, exact matches before
//! dynamic ones; a path no rule matches passes through unchanged.

use std::collections::HashMap;

/// Ordered rewrite rules, `(pattern, replacement)`.
pub type RouteRewrites = Vec<(String, String)>;

/// Map a source path to its output path through the rewrite rules.
///
/// Malformed dynamic patterns and replacements referencing parameters the
/// pattern never captured are skipped, falling through to the next rule.
pub fn resolve_output_path(path: &str, rewrites: &[(String, String)]) -> String {
    for (pattern, replacement) in rewrites {
        if pattern == path {
            return replacement.clone();
        }
    }

    for (pattern, replacement) in rewrites {
        if !pattern.contains(':') && !pattern.contains('*') {
            continue;
        }
        if let Some(params) = match_pattern(pattern, path) {
            if let Some(resolved) = compile_replacement(replacement, &params) {
                return resolved;
            }
        }
    }

    path.to_string()
}

/// Match a dynamic pattern against a path, capturing named parameters.
/// Wildcard captures are already re-joined with `/`.
fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    let mut params = HashMap::new();

    for (i, seg) in pattern_segments.iter().enumerate() {
        if let Some(rest) = seg.strip_prefix('*') {
            // Wildcard only makes sense as the final segment.
            if i + 1 != pattern_segments.len() {
                return None;
            }
            let name = if rest.is_empty() { "wildcard" } else { rest };
            if !rest.is_empty() && !is_param_name(rest) {
                return None;
            }
            let remainder = if i < path_segments.len() {
                path_segments[i..].join("/")
            } else {
                String::new()
            };
            params.insert(name.to_string(), remainder);
            return Some(params);
        }

        let candidate = path_segments.get(i)?;

        if let Some(rest) = seg.strip_prefix(':') {
            let name: String = rest.chars().take_while(|c| is_param_char(*c)).collect();
            if name.is_empty() {
                return None;
            }
            let suffix = &rest[name.len()..];
            let value = candidate.strip_suffix(suffix)?;
            if value.is_empty() {
                return None;
            }
            params.insert(name, value.to_string());
        } else if seg != candidate {
            return None;
        }
    }

    if path_segments.len() != pattern_segments.len() {
        return None;
    }
    Some(params)
}

fn compile_replacement(replacement: &str, params: &HashMap<String, String>) -> Option<String> {
    let mut out = String::new();
    let mut chars = replacement.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != ':' && c != '*' {
            out.push(c);
            continue;
        }
        let start = i + c.len_utf8();
        let name: String = replacement[start..]
            .chars()
            .take_while(|ch| is_param_char(*ch))
            .collect();
        if name.is_empty() && c == '*' {
            out.push_str(params.get("wildcard")?);
            continue;
        }
        if name.is_empty() {
            out.push(c);
            continue;
        }
        out.push_str(params.get(&name)?);
        for _ in 0..name.chars().count() {
            chars.next();
        }
    }

    Some(out)
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_param_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_param_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> RouteRewrites {
        pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn exact_match_wins() {
        let rewrites = rules(&[("docs/guide/index.md", "guide.md")]);
        assert_eq!(resolve_output_path("docs/guide/index.md", &rewrites), "guide.md");
    }

    #[test]
    fn no_rule_is_identity() {
        let rewrites = rules(&[("other.md", "moved.md")]);
        assert_eq!(resolve_output_path("docs/guide.md", &rewrites), "docs/guide.md");
    }

    #[test]
    fn named_parameter_captures_segment() {
        let rewrites = rules(&[("packages/:pkg/README.md", ":pkg.md")]);
        assert_eq!(resolve_output_path("packages/core/README.md", &rewrites), "core.md");
    }

    #[test]
    fn parameter_with_suffix() {
        let rewrites = rules(&[("docs/:page.md", "guide/:page.md")]);
        assert_eq!(resolve_output_path("docs/intro.md", &rewrites), "guide/intro.md");
    }

    #[test]
    fn wildcard_captures_rest() {
        let rewrites = rules(&[("docs/*rest", "*rest")]);
        assert_eq!(resolve_output_path("docs/a/b/c.md", &rewrites), "a/b/c.md");
    }

    #[test]
    fn bare_wildcard() {
        let rewrites = rules(&[("internal/*", "hidden/*")]);
        assert_eq!(resolve_output_path("internal/x/y.md", &rewrites), "hidden/x/y.md");
    }

    #[test]
    fn wildcard_matches_empty_rest() {
        let rewrites = rules(&[("docs/*rest", "out/*rest")]);
        assert_eq!(resolve_output_path("docs", &rewrites), "out/");
    }

    #[test]
    fn segment_count_must_match_without_wildcard() {
        let rewrites = rules(&[("docs/:page", ":page")]);
        assert_eq!(resolve_output_path("docs/a/b", &rewrites), "docs/a/b");
    }

    #[test]
    fn malformed_pattern_skipped() {
        let rewrites = rules(&[("docs/:", "broken"), ("docs/:page", "ok/:page")]);
        assert_eq!(resolve_output_path("docs/intro", &rewrites), "ok/intro");
    }

    #[test]
    fn replacement_with_unknown_param_skipped() {
        let rewrites = rules(&[("docs/:page", ":missing.md"), ("docs/:page", ":page.md")]);
        assert_eq!(resolve_output_path("docs/intro", &rewrites), "intro.md");
    }

    #[test]
    fn first_matching_rule_wins() {
        let rewrites = rules(&[("api/:name.md", "reference/:name.md"), ("api/*", "fallback.md")]);
        assert_eq!(resolve_output_path("api/auth.md", &rewrites), "reference/auth.md");
    }
}
