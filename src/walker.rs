//! Recursive directory enumeration for the routes tree.
//!
//! The walker yields every regular file with no filtering of its own; hidden
//! segments and extensions are the caller's concern. Entries are visited in
//! sorted order so discovery is deterministic across platforms.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file discovered under the routes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the root, always forward-slash separated.
    pub rel: String,
    /// Absolute (root-joined) path on disk.
    pub abs: PathBuf,
}

/// Recursively enumerate regular files under `root`.
///
/// Symlinked directories are not followed. Directory entries are sorted by
/// file name at each level, so the result order is stable.
pub fn walk_files(root: &Path) -> io::Result<Vec<WalkedFile>> {
    let mut out = Vec::new();
    walk_into(root, String::new(), &mut out)?;
    debug!(root = %root.display(), files = out.len(), "Routes tree walked");
    Ok(out)
}

fn walk_into(dir: &Path, rel_prefix: String, out: &mut Vec<WalkedFile>) -> io::Result<()> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let rel = if rel_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{rel_prefix}/{name}")
        };
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_into(&entry.path(), rel, out)?;
        } else if file_type.is_file() {
            out.push(WalkedFile {
                rel,
                abs: entry.path(),
            });
        }
    }
    Ok(())
}

/// Reduce a list of slash paths to its topmost entries.
///
/// `["/baz", "/foo", "/foo/bar"]` becomes `["/baz", "/foo"]`. Useful for
/// callers that mount static-asset directories discovered next to the routes
/// tree and only want the outermost mount points.
pub fn filter_topmost<S: AsRef<str>>(list: &[S]) -> Vec<String> {
    let mut sorted: Vec<&str> = list.iter().map(|s| s.as_ref()).collect();
    sorted.sort_unstable();

    let mut out: Vec<String> = Vec::new();
    for candidate in &sorted {
        let covered = out
            .iter()
            .any(|kept| candidate.starts_with(&format!("{kept}/")));
        if !covered {
            out.push((*candidate).to_string());
        }
    }
    out
}
