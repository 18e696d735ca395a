//! Thumbnails written under the assets root and served back from `/assets`.

use super::{PendingFile, StagedThumbnail, StorageError, ThumbnailStorage};
use crate::common::upload::{ByteStream, ImageType};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: Url,
    max_bytes: usize,
}

impl LocalFileStorage {
    /// `base_url` must end with a slash, e.g. `http://localhost:8091/assets/`.
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: Url,
        max_bytes: usize,
    ) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;

        Ok(Self {
            root,
            base_url,
            max_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(video_id: Uuid, image_type: ImageType) -> String {
        format!("{}.{}", video_id, image_type.extension())
    }

    fn asset_url(&self, file_name: &str) -> Result<String, StorageError> {
        self.base_url
            .join(file_name)
            .map(String::from)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))
    }

    /// Copies the stream chunk by chunk, returning the number of bytes written.
    async fn write_stream(&self, path: &Path, mut body: ByteStream<'_>) -> Result<u64, StorageError> {
        let mut file = File::create(path).await?;
        let mut written: usize = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(StorageError::Stream)?;
            written += chunk.len();
            if written > self.max_bytes {
                return Err(StorageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written as u64)
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove partial upload {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl ThumbnailStorage for LocalFileStorage {
    async fn stage(
        &self,
        video_id: Uuid,
        image_type: ImageType,
        body: ByteStream<'_>,
    ) -> Result<StagedThumbnail, StorageError> {
        let file_name = Self::file_name(video_id, image_type);
        let reference = self.asset_url(&file_name)?;
        // Same directory as the destination so the final rename is atomic.
        // The assets route refuses dot-prefixed names.
        let partial = self
            .root
            .join(format!(".{}.{}.part", file_name, Uuid::new_v4().simple()));

        match self.write_stream(&partial, body).await {
            Ok(size) => {
                debug!("Staged {} bytes at {}", size, partial.display());
                Ok(StagedThumbnail::pending_file(
                    reference,
                    size,
                    partial,
                    self.root.join(file_name),
                ))
            }
            Err(e) => {
                remove_partial(&partial).await;
                Err(e)
            }
        }
    }

    async fn commit(&self, staged: StagedThumbnail) -> Result<(), StorageError> {
        let Some(PendingFile {
            partial,
            destination,
        }) = staged.pending
        else {
            return Ok(());
        };

        if let Err(e) = fs::rename(&partial, &destination).await {
            remove_partial(&partial).await;
            return Err(e.into());
        }

        debug!("Published {}", destination.display());
        Ok(())
    }

    async fn discard(&self, staged: StagedThumbnail) {
        if let Some(pending) = staged.pending {
            remove_partial(&pending.partial).await;
        }
    }
}
