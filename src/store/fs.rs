//! Local filesystem object store.
//!
//! Objects live as plain files in one flat directory; the object key is
//! the file name. This is the default backend and the one integration
//! tests run against.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio_util::io::ReaderStream;

use super::{ObjectStore, ObjectStream, PutOutcome, StoreError};

/// Flat-directory object store rooted at a configured path.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its path inside the root.
    ///
    /// Keys are file names, not paths: separators and `..` are rejected so
    /// a hostile client filename cannot escape the root directory.
    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key == "." || key == ".." || key.contains('/') || key.contains('\\') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<PutOutcome, StoreError> {
        let path = self.object_path(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &data).await?;

        Ok(PutOutcome {
            location: path.display().to_string(),
        })
    }

    async fn get(&self, key: &str) -> Result<ObjectStream, StoreError> {
        let path = self.object_path(key)?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        Ok(ReaderStream::new(file).boxed())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // An absent object is already deleted.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use futures::StreamExt;

    async fn collect(mut stream: ObjectStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        let outcome = store
            .put("1717430000000-a.png", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert!(outcome.location.ends_with("1717430000000-a.png"));

        let body = collect(store.get("1717430000000-a.png").await.unwrap()).await;
        assert_eq!(body, b"abc");

        store.delete("1717430000000-a.png").await.unwrap();
        assert_matches!(
            store.get("1717430000000-a.png").await.err(),
            Some(StoreError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn put_creates_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("objects");
        let store = FsObjectStore::new(&root);

        store.put("k.png", Bytes::from_static(b"x")).await.unwrap();
        assert!(root.join("k.png").exists());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        assert_matches!(store.get("nope.png").await.err(), Some(StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.delete("never-stored.png").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        for key in ["", ".", "..", "a/b.png", "a\\b.png"] {
            assert_matches!(
                store.put(key, Bytes::from_static(b"x")).await,
                Err(StoreError::InvalidKey(_)),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn put_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.put("k.png", Bytes::from_static(b"old")).await.unwrap();
        store.put("k.png", Bytes::from_static(b"new")).await.unwrap();

        let body = collect(store.get("k.png").await.unwrap()).await;
        assert_eq!(body, b"new");
    }
}
