// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface.
///
/// The change detector only ever needs to enumerate a tree and read
/// modification times, so that is all this exposes.
pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// True if `path` itself is a symbolic link (not following it).
    fn is_symlink(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Last modification time of `path`.
    fn modified(&self, path: &Path) -> Result<SystemTime>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let meta = fs::metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        meta.modified()
            .with_context(|| format!("reading modification time of {:?}", path))
    }
}

/// Depth-first walk returning every regular file under `root`.
///
/// The root itself must be readable. Subdirectories that vanish or cannot be
/// listed mid-walk are skipped. Symlinks to files are kept; symlinked
/// directories are never entered, so link cycles cannot blow up the walk.
pub fn walk_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = fs.read_dir(root)?;

    while let Some(path) = stack.pop() {
        if fs.is_symlink(&path) {
            if fs.is_file(&path) {
                files.push(path);
            } else {
                debug!(path = ?path, "not following symlink");
            }
        } else if fs.is_dir(&path) {
            match fs.read_dir(&path) {
                Ok(children) => stack.extend(children),
                Err(err) => debug!(path = ?path, error = %err, "skipping unreadable directory"),
            }
        } else if fs.is_file(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::mock::MockFileSystem;
    use super::*;

    #[test]
    fn walk_finds_nested_files_only() {
        let fs = MockFileSystem::new();
        fs.add_file("./a.txt");
        fs.add_file("./src/main.rs");
        fs.add_file("./src/deep/er/mod.rs");

        let mut files = walk_files(&fs, Path::new(".")).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![
                PathBuf::from("./a.txt"),
                PathBuf::from("./src/deep/er/mod.rs"),
                PathBuf::from("./src/main.rs"),
            ]
        );
    }

    #[test]
    fn walk_skips_symlinked_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("./src/main.rs");
        fs.add_file("./linked/main.rs");
        fs.mark_symlink("./linked");

        let files = walk_files(&fs, Path::new(".")).unwrap();
        assert_eq!(files, vec![PathBuf::from("./src/main.rs")]);
    }

    #[cfg(unix)]
    #[test]
    fn real_fs_walk_survives_symlink_loops() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();
        std::os::unix::fs::symlink(".", dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(".", dir.path().join("again")).unwrap();
        std::os::unix::fs::symlink("a.txt", dir.path().join("alias.txt")).unwrap();

        let mut files = walk_files(&RealFileSystem, dir.path()).unwrap();
        files.sort();

        assert_eq!(files, vec![file, dir.path().join("alias.txt")]);
    }

    #[test]
    fn walk_of_missing_root_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(walk_files(&fs, Path::new("./nowhere")).is_err());
    }

    #[test]
    fn real_fs_reports_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "x").unwrap();

        let fs = RealFileSystem;
        assert!(fs.modified(&file).is_ok());
        assert!(fs.modified(&dir.path().join("missing")).is_err());

        let files = walk_files(&fs, dir.path()).unwrap();
        assert_eq!(files, vec![file]);
    }
}
