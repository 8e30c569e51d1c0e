//! Storage collaborator used for completion checks and metadata documents

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Minimal file access needed by the orchestrator
///
/// Kept as a trait so the skip check can run against an in-memory store.
pub trait Storage {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `contents` so that readers never observe a partial file
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Removes a file; missing files are not an error
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Storage backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let tmp = temp_sibling(path);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// `<name>.partial` next to `path`
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_write_replaces_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("meta.json");
        let storage = FsStorage;

        storage.write(&path, b"first").unwrap();
        storage.write(&path, b"second").unwrap();

        assert_eq!(storage.read(&path).unwrap(), b"second");
        assert!(!temp_dir.path().join("meta.json.partial").exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_fs_exists_and_create_dir_all() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = FsStorage;

        assert!(!storage.exists(&nested));
        storage.create_dir_all(&nested).unwrap();
        assert!(storage.exists(&nested));
    }

    #[test]
    fn test_fs_remove_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("meta.json");
        FsStorage.remove_file(&path).unwrap();

        FsStorage.write(&path, b"{}").unwrap();
        FsStorage.remove_file(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_fs_write_into_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("meta.json");
        assert!(FsStorage.write(&path, b"x").is_err());
    }
}
