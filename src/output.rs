//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! # Output Format
//!
//! ```text
//! llms.txt (1.2 KB)
//! llms-full.txt (48.3 KB)
//! guide/llms.txt (640 B)
//! guide/setup.md (2.1 KB)
//! warning: skipped: invalid frontmatter in broken.md: ...
//!
//! Generated 4 artifacts from 12 documents, 1 warning
//! ```

use crate::session::BuildReport;

/// Human-readable byte size: `640 B`, `2.1 KB`, `48.3 MB`.
fn human_size(bytes: usize) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

fn count_noun(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Format a build report: one line per artifact with its size, warnings
/// prefixed distinctly, and a summary line.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    for artifact in &report.artifacts {
        lines.push(format!("{} ({})", artifact.path, human_size(artifact.bytes)));
    }
    for warning in &report.warnings {
        lines.push(format!("warning: {warning}"));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} from {}, {}",
        count_noun(report.artifacts.len(), "artifact"),
        count_noun(report.prepared, "document"),
        count_noun(report.warnings.len(), "warning"),
    ));

    lines
}

/// Format a check report: per-file problems and a verdict line.
pub fn format_check_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    for warning in &report.warnings {
        lines.push(format!("warning: {warning}"));
    }
    lines.push(format!(
        "Checked {}, {}",
        count_noun(report.prepared, "document"),
        count_noun(report.warnings.len(), "warning"),
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{line}");
    }
}

/// Print check output to stdout.
pub fn print_check_output(report: &BuildReport) {
    for line in format_check_output(report) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Artifact;

    fn report() -> BuildReport {
        BuildReport {
            artifacts: vec![
                Artifact { path: "llms.txt".to_string(), bytes: 640 },
                Artifact { path: "llms-full.txt".to_string(), bytes: 49_460 },
            ],
            warnings: vec!["skipped: broken.md".to_string()],
            prepared: 12,
        }
    }

    #[test]
    fn human_size_bytes() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
    }

    #[test]
    fn human_size_kilobytes() {
        assert_eq!(human_size(1024), "1.0 KB");
        assert_eq!(human_size(49_460), "48.3 KB");
    }

    #[test]
    fn human_size_megabytes() {
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn build_output_lists_artifacts_with_sizes() {
        let lines = format_build_output(&report());
        assert_eq!(lines[0], "llms.txt (640 B)");
        assert_eq!(lines[1], "llms-full.txt (48.3 KB)");
    }

    #[test]
    fn build_output_prefixes_warnings() {
        let lines = format_build_output(&report());
        assert!(lines.contains(&"warning: skipped: broken.md".to_string()));
    }

    #[test]
    fn build_output_summary_line() {
        let lines = format_build_output(&report());
        assert_eq!(
            lines.last().unwrap(),
            "Generated 2 artifacts from 12 documents, 1 warning"
        );
    }

    #[test]
    fn check_output_verdict() {
        let lines = format_check_output(&report());
        assert_eq!(lines.last().unwrap(), "Checked 12 documents, 1 warning");
    }

    #[test]
    fn empty_report_formats_cleanly() {
        let lines = format_build_output(&BuildReport::default());
        assert_eq!(lines.last().unwrap(), "Generated 0 artifacts from 0 documents, 0 warnings");
    }
}
