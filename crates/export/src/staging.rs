//! Staged writing of companion files.
//!
//! Every file of a dataset is first written to a temporary file in the
//! destination directory, then each one is renamed into place. A failure
//! while writing leaves the existing files untouched. Each rename is atomic
//! on its own; if one fails, files renamed before it already hold the new
//! contents, the error names the failing path, and no temporaries remain.

use hypergraph_core::{Error, Result};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A set of files rendered in memory, committed together.
#[derive(Debug)]
pub struct StagedFileSet {
    dir: PathBuf,
    files: Vec<(String, String)>,
}

impl StagedFileSet {
    /// Create an empty file set targeting `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Add a file by name with its full contents.
    pub fn add(&mut self, name: impl Into<String>, contents: String) {
        self.files.push((name.into(), contents));
    }

    /// Destination path of a file in this set.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write every file, creating the directory if needed and overwriting
    /// existing files. Returns final paths in insertion order.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        for (name, _) in &self.files {
            check_file_name(name)?;
        }
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        // Unpersisted temporaries delete themselves when dropped.
        let mut staged: Vec<(NamedTempFile, PathBuf)> = Vec::with_capacity(self.files.len());
        for (name, contents) in &self.files {
            let mut tmp = tempfile::Builder::new()
                .prefix(".")
                .suffix(".tmp")
                .tempfile_in(&self.dir)
                .map_err(|e| io_error(&self.dir, e))?;
            tmp.write_all(contents.as_bytes())
                .and_then(|()| tmp.as_file().sync_all())
                .and_then(|()| make_readable(tmp.as_file()))
                .map_err(|e| io_error(tmp.path(), e))?;
            staged.push((tmp, self.dir.join(name)));
        }

        let mut committed = Vec::with_capacity(staged.len());
        for (tmp, final_path) in staged {
            tmp.persist(&final_path).map_err(|e| io_error(&final_path, e.error))?;
            committed.push(final_path);
        }
        debug!(dir = %self.dir.display(), files = committed.len(), "committed file set");
        Ok(committed)
    }
}

fn check_file_name(name: &str) -> Result<()> {
    if matches!(name, "" | "." | "..") || name.contains(['/', '\\', '\0']) {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{name:?} is not a plain file name"),
        )));
    }
    Ok(())
}

/// Temporaries start owner-only; committed files get mode 0644.
#[cfg(unix)]
fn make_readable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_readable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {e}", path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_commit_creates_dir_and_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");

        let mut set = StagedFileSet::new(&out);
        set.add("a.txt", "1\n".to_string());
        set.add("b.txt", "2\n".to_string());

        let paths = set.commit().unwrap();
        assert_eq!(paths, vec![out.join("a.txt"), out.join("b.txt")]);
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "1\n");
        assert_eq!(fs::read_to_string(out.join("b.txt")).unwrap(), "2\n");
    }

    #[test]
    fn test_commit_overwrites_and_leaves_no_temporaries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "old\n").unwrap();

        let mut set = StagedFileSet::new(dir.path());
        set.add("a.txt", "new\n".to_string());
        set.commit().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new\n");
        assert_eq!(dir_names(dir.path()), vec!["a.txt".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_committed_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();

        let mut set = StagedFileSet::new(dir.path());
        set.add("a.txt", "1\n".to_string());
        set.commit().unwrap();

        let mode = fs::metadata(dir.path().join("a.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_bad_name_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "old\n").unwrap();

        let mut set = StagedFileSet::new(dir.path());
        set.add("a.txt", "new\n".to_string());
        set.add("missing/b.txt", "x\n".to_string());

        assert!(set.commit().is_err());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "old\n");
        assert_eq!(dir_names(dir.path()), vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_failed_rename_names_path_and_removes_temporaries() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(dir.path().join("b.txt")).unwrap();
        fs::write(dir.path().join("b.txt").join("keep"), "").unwrap();

        let mut set = StagedFileSet::new(dir.path());
        set.add("a.txt", "1\n".to_string());
        set.add("b.txt", "2\n".to_string());
        set.add("c.txt", "3\n".to_string());

        let err = set.commit().unwrap_err();
        assert!(err.to_string().contains("b.txt"));
        assert!(dir.path().join("b.txt").join("keep").exists());
        assert!(!dir.path().join("c.txt").exists());
        assert!(dir_names(dir.path()).iter().all(|n| !n.ends_with(".tmp")));
    }
}
