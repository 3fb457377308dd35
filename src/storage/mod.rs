//! Image storage for board attachments.
//!
//! [`FileStore`] turns an uploaded payload into an opaque [`ImageId`] and
//! resolves ids back to public paths. [`local::LocalFileStore`] keeps the
//! files on disk.

pub mod local;

use std::fmt;

use async_trait::async_trait;

use crate::domain::ImageId;
use crate::error::BoardError;

pub use local::LocalFileStore;

/// A file received with a board submission.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// File name as sent by the client, used for the extension only.
    pub file_name: Option<String>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Returns `true` if the upload carries no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Storage contract for board images.
#[async_trait]
pub trait FileStore: Send + Sync + fmt::Debug {
    /// Stores `file` and returns its new id, or `None` when the upload is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Storage`] if the file cannot be written.
    async fn store(&self, file: &UploadedFile) -> Result<Option<ImageId>, BoardError>;

    /// Resolves an image id to a displayable path; `None` in, `None` out.
    fn resolve_path(&self, image_id: Option<&ImageId>) -> Option<String>;

    /// Deletes a stored image. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Storage`] on I/O failure or an unsafe id.
    async fn remove(&self, image_id: &ImageId) -> Result<bool, BoardError>;
}
