use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

const METADATA_MARKER: &str = ".git";
const MAX_DEPTH: usize = 3;

/// Finds repository roots at `base` and up to three directory levels below.
///
/// Shallower roots come first; siblings are visited in file-name order.
/// Unreadable directories are skipped.
pub fn discover_repositories(base: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut found: Vec<(usize, PathBuf)> = Vec::new();

    if is_repository_root(base) {
        seen.insert(base.to_path_buf());
        found.push((0, base.to_path_buf()));
    }

    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(MAX_DEPTH)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != METADATA_MARKER);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable path during discovery");
                continue;
            }
        };
        if !entry.file_type().is_dir() || !is_repository_root(entry.path()) {
            continue;
        }
        let path = entry.path().to_path_buf();
        if seen.insert(path.clone()) {
            found.push((entry.depth(), path));
        }
    }

    found.sort_by_key(|(depth, _)| *depth);
    found.into_iter().map(|(_, path)| path).collect()
}

fn is_repository_root(dir: &Path) -> bool {
    dir.join(METADATA_MARKER).exists()
}
