use globset::GlobMatcher;
use log::{debug, error};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively lists files under `root` whose filename matches `matcher`
///
/// Symlinks are followed, so linked exports are candidates like any other
/// file. Entries are returned in a stable, name-sorted order. Unreadable
/// entries and link loops are logged and skipped.
pub fn discover_files(root: &Path, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error reading directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    debug!("Discovered {} candidate files under {}", files.len(), root.display());
    files
}
