//! Directory-depth partitioning.
//!
//! Decides which directories get their own `llms.txt`/`llms-full.txt` pair:
//! the root always does, and every directory prefix shallower than the
//! configured depth that actually contains a file.

use std::collections::BTreeSet;

use crate::paths::to_posix;

/// One directory slated for artifact emission. The root is `"."` at depth 1;
/// an immediate subdirectory is depth 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub relative_path: String,
    pub depth: usize,
}

/// Collect the emission directories for a file set, deduplicated and sorted
/// by depth then path.
pub fn directories_at_depths(relative_paths: &[String], max_depth: usize) -> Vec<Directory> {
    let mut found: BTreeSet<(usize, String)> = BTreeSet::new();
    found.insert((1, ".".to_string()));

    for path in relative_paths {
        let posix = to_posix(path);
        let segments: Vec<&str> = posix.split('/').collect();
        // Last segment is the file itself; each shorter prefix is a
        // directory containing it.
        for prefix_len in 1..segments.len() {
            if prefix_len < max_depth {
                found.insert((prefix_len + 1, segments[..prefix_len].join("/")));
            }
        }
    }

    found
        .into_iter()
        .map(|(depth, relative_path)| Directory { relative_path, depth })
        .collect()
}
