use super::model::Video;
use crate::infrastructure::db::pool::DbPool;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("video {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Read and write access to video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Video, RepositoryError>;

    /// Writes every mutable column of `video` back to the store.
    async fn update_video(&self, video: &Video) -> Result<(), RepositoryError>;
}

pub struct VideoRepository {
    pool: DbPool,
}

impl VideoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Video, RepositoryError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        video.ok_or(RepositoryError::NotFound(id))
    }

    async fn update_video(&self, video: &Video) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $1, description = $2, thumbnail_url = $3, video_url = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.updated_at)
        .bind(video.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(video.id));
        }

        Ok(())
    }
}
