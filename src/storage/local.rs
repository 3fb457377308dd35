//! Local filesystem implementation of [`FileStore`].
//!
//! Files are named `<uuid-v4>.<ext>` and sharded by the first two
//! characters of the name:
//! ```text
//! {upload_dir}/
//! ├── 3f/
//! │   └── 3f2a9c1e-8b7d-4e6f-a5c4-0d1e2f3a4b5c.png
//! └── c0/
//!     └── c0ffee00-1234-4abc-8def-0123456789ab.jpg
//! ```
//! The public path mirrors that layout under the configured URL prefix.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{FileStore, UploadedFile};
use crate::domain::ImageId;
use crate::error::BoardError;

/// Extension used when the client name has none we can trust.
const FALLBACK_EXTENSION: &str = "bin";

/// Longest extension kept from a client file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Stores board images below a base directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_path: PathBuf,
    url_prefix: String,
}

impl LocalFileStore {
    /// Creates a store rooted at `base_path`, creating the directory if
    /// needed. `url_prefix` (e.g. `/images`) is prepended to resolved paths.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Storage`] if the directory cannot be created.
    pub async fn new(
        base_path: impl Into<PathBuf>,
        url_prefix: impl Into<String>,
    ) -> Result<Self, BoardError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| storage_error("create upload directory", &e))?;

        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_path,
            url_prefix,
        })
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the on-disk location of `image_id`.
    #[must_use]
    pub fn file_path(&self, image_id: &ImageId) -> PathBuf {
        self.base_path
            .join(shard(image_id))
            .join(image_id.as_str())
    }

    /// Reads a stored image back.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Storage`] if the id is unsafe or the file
    /// cannot be read.
    pub async fn load(&self, image_id: &ImageId) -> Result<Vec<u8>, BoardError> {
        ensure_safe(image_id)?;
        fs::read(self.file_path(image_id))
            .await
            .map_err(|e| storage_error("read image", &e))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, file: &UploadedFile) -> Result<Option<ImageId>, BoardError> {
        if file.is_empty() {
            return Ok(None);
        }

        let ext = extract_extension(file.file_name.as_deref().unwrap_or_default());
        let image_id = ImageId::new(format!("{}.{ext}", Uuid::new_v4()));
        let path = self.file_path(&image_id);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create shard directory", &e))?;
        }
        fs::write(&path, &file.bytes)
            .await
            .map_err(|e| storage_error("write image", &e))?;

        tracing::debug!(%image_id, bytes = file.bytes.len(), "image stored");
        Ok(Some(image_id))
    }

    fn resolve_path(&self, image_id: Option<&ImageId>) -> Option<String> {
        image_id.map(|id| format!("{}/{}/{}", self.url_prefix, shard(id), id))
    }

    async fn remove(&self, image_id: &ImageId) -> Result<bool, BoardError> {
        ensure_safe(image_id)?;
        match fs::remove_file(self.file_path(image_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("remove image", &e)),
        }
    }
}

/// First two characters of the id (the whole id if shorter).
fn shard(image_id: &ImageId) -> &str {
    let raw = image_id.as_str();
    raw.get(..2).unwrap_or(raw)
}

/// Lower-cased alphanumeric extension of `file_name`, or [`FALLBACK_EXTENSION`].
fn extract_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(|| FALLBACK_EXTENSION.to_string(), str::to_ascii_lowercase)
}

fn ensure_safe(image_id: &ImageId) -> Result<(), BoardError> {
    if image_id.is_safe() {
        Ok(())
    } else {
        Err(BoardError::Storage(format!("invalid image id: {image_id}")))
    }
}

fn storage_error(action: &str, e: &io::Error) -> BoardError {
    BoardError::Storage(format!("failed to {action}: {e}"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn make_store() -> (tempfile::TempDir, LocalFileStore) {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let Ok(store) = LocalFileStore::new(dir.path().join("images"), "/images/").await else {
            panic!("store creation failed");
        };
        (dir, store)
    }

    fn upload(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn store_writes_sharded_file() {
        let (_dir, store) = make_store().await;
        let Ok(Some(id)) = store.store(&upload("Cat.PNG", b"meow")).await else {
            panic!("store failed");
        };

        assert!(id.as_str().ends_with(".png"));
        assert!(id.is_safe());
        let path = store.file_path(&id);
        assert!(path.starts_with(store.base_path().join(shard(&id))));
        assert_eq!(store.load(&id).await.ok(), Some(b"meow".to_vec()));
    }

    #[tokio::test]
    async fn empty_upload_stores_nothing() {
        let (_dir, store) = make_store().await;
        let result = store.store(&upload("empty.png", b"")).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn resolve_path_uses_prefix_and_shard() {
        let (_dir, store) = make_store().await;
        let id = ImageId::new("abcdef.png");
        assert_eq!(
            store.resolve_path(Some(&id)).as_deref(),
            Some("/images/ab/abcdef.png")
        );
        assert_eq!(store.resolve_path(None), None);
    }

    #[tokio::test]
    async fn remove_reports_whether_file_existed() {
        let (_dir, store) = make_store().await;
        let Ok(Some(id)) = store.store(&upload("a.gif", b"GIF89a")).await else {
            panic!("store failed");
        };
        assert!(matches!(store.remove(&id).await, Ok(true)));
        assert!(matches!(store.remove(&id).await, Ok(false)));
    }

    #[tokio::test]
    async fn unsafe_ids_never_touch_the_filesystem() {
        let (_dir, store) = make_store().await;
        let evil = ImageId::new("../../etc/passwd");
        assert!(matches!(store.remove(&evil).await, Err(BoardError::Storage(_))));
        assert!(matches!(store.load(&evil).await, Err(BoardError::Storage(_))));
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(extract_extension("photo.JPG"), "jpg");
        assert_eq!(extract_extension("noext"), "bin");
        assert_eq!(extract_extension("weird.p$g"), "bin");
        assert_eq!(extract_extension("long.abcdefghijk"), "bin");
        assert_eq!(extract_extension(""), "bin");
    }
}
