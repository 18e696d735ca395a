use super::{StagedThumbnail, StorageError, ThumbnailStorage, read_bounded};
use crate::common::upload::{ByteStream, ImageType};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use uuid::Uuid;

/// Keeps the thumbnail on the record as `data:<mime>;base64,<payload>`.
#[derive(Clone, Debug)]
pub struct EmbeddedStorage {
    max_bytes: usize,
}

impl EmbeddedStorage {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

pub fn data_uri(image_type: ImageType, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        image_type.mime_type(),
        general_purpose::STANDARD.encode(data)
    )
}

#[async_trait]
impl ThumbnailStorage for EmbeddedStorage {
    async fn stage(
        &self,
        _video_id: Uuid,
        image_type: ImageType,
        body: ByteStream<'_>,
    ) -> Result<StagedThumbnail, StorageError> {
        let data = read_bounded(body, self.max_bytes).await?;

        Ok(StagedThumbnail::inline(
            data_uri(image_type, &data),
            data.len() as u64,
        ))
    }
}
