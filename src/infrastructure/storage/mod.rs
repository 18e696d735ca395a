use crate::common::upload::{ByteStream, ImageType};
use crate::config::settings::{AppConfig, ThumbnailStorageKind};
use anyhow::Context;
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;
use std::{io, path::PathBuf, sync::Arc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub mod embedded;
pub mod local;

pub use embedded::EmbeddedStorage;
pub use local::LocalFileStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload stream failed")]
    Stream(#[source] io::Error),
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bytes accepted by a backend but not yet visible under `reference`.
///
/// Nothing changes for readers until [`ThumbnailStorage::commit`] runs, and
/// [`ThumbnailStorage::discard`] drops the bytes without a trace.
#[derive(Debug)]
pub struct StagedThumbnail {
    pub reference: String,
    pub size: u64,
    pending: Option<PendingFile>,
}

/// Fully written temp file waiting to be moved over its published name.
#[derive(Debug)]
struct PendingFile {
    partial: PathBuf,
    destination: PathBuf,
}

impl StagedThumbnail {
    /// Reference that carries the bytes itself; committing is a no-op.
    pub fn inline(reference: String, size: u64) -> Self {
        Self {
            reference,
            size,
            pending: None,
        }
    }

    fn pending_file(reference: String, size: u64, partial: PathBuf, destination: PathBuf) -> Self {
        Self {
            reference,
            size,
            pending: Some(PendingFile {
                partial,
                destination,
            }),
        }
    }
}

/// Persists thumbnail bytes in two steps so the record update decides
/// whether they ever become visible.
#[async_trait]
pub trait ThumbnailStorage: Send + Sync {
    async fn stage(
        &self,
        video_id: Uuid,
        image_type: ImageType,
        body: ByteStream<'_>,
    ) -> Result<StagedThumbnail, StorageError>;

    async fn commit(&self, staged: StagedThumbnail) -> Result<(), StorageError> {
        let _ = staged;
        Ok(())
    }

    async fn discard(&self, staged: StagedThumbnail) {
        let _ = staged;
    }
}

pub async fn from_config(
    config: &AppConfig,
    max_bytes: usize,
) -> anyhow::Result<Arc<dyn ThumbnailStorage>> {
    match config.thumbnail_storage {
        ThumbnailStorageKind::Embedded => {
            info!("✅ Storing thumbnails as data URIs");
            Ok(Arc::new(EmbeddedStorage::new(max_bytes)))
        }
        ThumbnailStorageKind::File => {
            let storage = LocalFileStorage::new(
                config.assets_root.clone(),
                config.assets_base_url()?,
                max_bytes,
            )
            .await
            .with_context(|| {
                format!("preparing assets root {}", config.assets_root.display())
            })?;
            info!("✅ Storing thumbnails under {}", config.assets_root.display());
            Ok(Arc::new(storage))
        }
    }
}

/// Buffers a stream in memory, failing once it grows past `max_bytes`.
pub(crate) async fn read_bounded(
    mut body: ByteStream<'_>,
    max_bytes: usize,
) -> Result<BytesMut, StorageError> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(StorageError::Stream)?;
        if buffer.len() + chunk.len() > max_bytes {
            return Err(StorageError::TooLarge { limit: max_bytes });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

#[cfg(test)]
pub(crate) fn chunked(chunks: Vec<io::Result<Vec<u8>>>) -> ByteStream<'static> {
    Box::pin(futures_util::stream::iter(
        chunks
            .into_iter()
            .map(|c| c.map(bytes::Bytes::from)),
    ))
}
