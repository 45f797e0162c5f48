//! Expanding a snapshot path prefix into its files.

use std::fs;
use std::path::{Path, PathBuf};

use snapfield_core::StoreError;
use tracing::debug;

/// Find the files composing a snapshot.
///
/// - If `prefix` is a directory, every regular file inside it whose name
///   ends with `suffix` is selected.
/// - If `prefix` is an existing file, it alone is selected.
/// - Otherwise every sibling whose name starts with the last component of
///   `prefix` and ends with `suffix` is selected (`snapdir/snap_600` matches
///   `snap_600.0.snap`, `snap_600.1.snap`, ...).
///
/// Results are sorted by path. An empty result is not an error here.
pub fn discover(prefix: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>, StoreError> {
    let prefix = prefix.as_ref();
    let mut paths = if prefix.is_dir() {
        matching(prefix, "", suffix)?
    } else if prefix.is_file() {
        vec![prefix.to_path_buf()]
    } else {
        let stem = prefix
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let parent = match prefix.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if parent.is_dir() {
            matching(parent, stem, suffix)?
        } else {
            Vec::new()
        }
    };
    paths.sort();
    debug!(prefix = %prefix.display(), suffix, files = paths.len(), "discovered snapshot files");
    Ok(paths)
}

fn matching(dir: &Path, stem: &str, suffix: &str) -> Result<Vec<PathBuf>, StoreError> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.len() >= stem.len() + suffix.len()
            && name.starts_with(stem)
            && name.ends_with(suffix)
            && entry.file_type()?.is_file()
        {
            out.push(entry.path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, b"").unwrap();
        p
    }

    #[test]
    fn directory_selects_suffix_matches() {
        let dir = tempfile::tempdir().unwrap();
        let b = touch(dir.path(), "snap_1.snap");
        let a = touch(dir.path(), "snap_0.snap");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("sub.snap")).unwrap();
        assert_eq!(discover(dir.path(), ".snap").unwrap(), vec![a, b]);
    }

    #[test]
    fn existing_file_selects_itself() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "snap_0.snap");
        touch(dir.path(), "snap_0.snap.bak");
        assert_eq!(discover(&a, ".snap").unwrap(), vec![a]);
    }

    #[test]
    fn prefix_selects_numbered_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let f0 = touch(dir.path(), "snap_600.0.snap");
        let f1 = touch(dir.path(), "snap_600.1.snap");
        touch(dir.path(), "snap_601.0.snap");
        touch(dir.path(), "snap_600.0.hdf5");
        let found = discover(dir.path().join("snap_600"), ".snap").unwrap();
        assert_eq!(found, vec![f0, f1]);
    }

    #[test]
    fn nothing_matching_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path().join("missing"), ".snap").unwrap().is_empty());
        assert!(discover(dir.path().join("no/such/dir/x"), ".snap").unwrap().is_empty());
    }
}
