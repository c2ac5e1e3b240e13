//! Local directory holding every served property image.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::reference::is_safe_filename;

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, error::SystemError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, error::SystemError> {
        if !is_safe_filename(name) {
            return Err(error::SystemError::bad_request("Invalid image name"));
        }
        Ok(self.root.join(name))
    }

    /// Writes the bytes under a fresh UUIDv7 name and returns that name.
    pub async fn save(&self, bytes: &[u8], extension: &str) -> Result<String, error::SystemError> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        let name = if extension.is_empty() {
            Uuid::now_v7().to_string()
        } else {
            format!("{}.{}", Uuid::now_v7(), extension)
        };
        fs::write(self.resolve(&name)?, bytes).await?;
        Ok(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, error::SystemError> {
        let path = self.resolve(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(error::SystemError::not_found("Image not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false when the file was already gone.
    pub async fn remove(&self, name: &str) -> Result<bool, error::SystemError> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// File names directly under the root, sorted.
    pub async fn list(&self) -> Result<Vec<String>, error::SystemError> {
        list_files(&self.root).await
    }

    /// Copies `source` in as `name` unless a file with that name is already stored.
    pub async fn import(&self, source: &Path, name: &str) -> Result<bool, error::SystemError> {
        let target = self.resolve(name)?;
        if fs::metadata(&target).await.is_ok() {
            return Ok(false);
        }
        fs::copy(source, &target).await?;
        Ok(true)
    }

    /// Copies a stored file into `dir`, keeping its name.
    pub async fn export(&self, name: &str, dir: &Path) -> Result<u64, error::SystemError> {
        let source = self.resolve(name)?;
        Ok(fs::copy(source, dir.join(name)).await?)
    }
}

/// Regular files directly inside `dir`; a missing directory lists as empty.
pub async fn list_files(dir: &Path) -> Result<Vec<String>, error::SystemError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("properties")).await.unwrap();

        let name = store.save(b"jpeg-bytes", ".JPG").await.unwrap();
        assert!(name.ends_with(".jpg"));
        assert!(store.exists(&name).await);
        assert_eq!(store.read(&name).await.unwrap(), b"jpeg-bytes");
        assert_eq!(store.list().await.unwrap(), vec![name.clone()]);

        assert!(store.remove(&name).await.unwrap());
        assert!(!store.remove(&name).await.unwrap());
        assert!(!store.exists(&name).await);
    }

    #[tokio::test]
    async fn rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).await.unwrap();

        assert!(!store.exists("../secret").await);
        assert!(matches!(store.read("../secret").await, Err(error::SystemError::BadRequest(_))));
        assert!(matches!(store.read("nope.jpg").await, Err(error::SystemError::NotFound(_))));
    }

    #[tokio::test]
    async fn import_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("store")).await.unwrap();
        let source = dir.path().join("incoming.jpg");
        tokio::fs::write(&source, b"new").await.unwrap();

        assert!(store.import(&source, "kept.jpg").await.unwrap());
        tokio::fs::write(&source, b"newer").await.unwrap();
        assert!(!store.import(&source, "kept.jpg").await.unwrap());
        assert_eq!(store.read("kept.jpg").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn list_skips_directories_and_missing_roots() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();
        tokio::fs::write(dir.path().join("b.png"), b"b").await.unwrap();
        tokio::fs::write(dir.path().join("a.png"), b"a").await.unwrap();

        assert_eq!(list_files(dir.path()).await.unwrap(), vec!["a.png", "b.png"]);
        assert!(list_files(&dir.path().join("absent")).await.unwrap().is_empty());
    }
}
