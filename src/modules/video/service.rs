use super::error::ThumbnailError;
use super::model::Video;
use crate::common::upload::{self, ImageType, THUMBNAIL_FIELD, UploadError};
use crate::modules::auth::service::{AuthError, AuthService};
use crate::state::AppState;
use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use axum::http::HeaderMap;
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

pub struct ThumbnailService;

impl ThumbnailService {
    /// Resolves the target video and the calling user, path first.
    pub fn validate_request(
        raw_video_id: &str,
        headers: &HeaderMap,
        jwt_secret: &str,
    ) -> Result<(Uuid, Uuid), ThumbnailError> {
        let video_id = Uuid::parse_str(raw_video_id).map_err(ThumbnailError::InvalidIdentifier)?;

        let token = AuthService::get_bearer_token(headers).map_err(ThumbnailError::MissingCredential)?;
        let user_id = AuthService::validate_jwt(token, jwt_secret).map_err(|e| match e {
            AuthError::InvalidToken(_) => ThumbnailError::InvalidCredential(e),
            other => ThumbnailError::MissingCredential(other),
        })?;

        Ok((video_id, user_id))
    }

    pub async fn upload_thumbnail(
        state: &AppState,
        raw_video_id: &str,
        headers: &HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Video, ThumbnailError> {
        let (video_id, user_id) =
            Self::validate_request(raw_video_id, headers, &state.config.jwt_secret)?;

        info!("Uploading thumbnail for video {} by user {}", video_id, user_id);

        let mut multipart = multipart.map_err(UploadError::from)?;

        while let Some(field) = multipart.next_field().await.map_err(UploadError::from)? {
            if field.name() != Some(THUMBNAIL_FIELD) {
                continue;
            }
            return Self::store_thumbnail(state, video_id, user_id, field).await;
        }

        Err(UploadError::MissingField(THUMBNAIL_FIELD).into())
    }

    async fn store_thumbnail(
        state: &AppState,
        video_id: Uuid,
        user_id: Uuid,
        field: Field<'_>,
    ) -> Result<Video, ThumbnailError> {
        let image_type = ImageType::from_content_type(upload::declared_content_type(&field))?;

        let mut video = state
            .videos
            .get_video(video_id)
            .await
            .map_err(ThumbnailError::storage("Couldn't get video from db"))?;

        if video.user_id != user_id {
            return Err(ThumbnailError::Forbidden);
        }

        // Staged bytes are only published once the record points at them.
        let staged = state
            .thumbnails
            .stage(video_id, image_type, upload::into_byte_stream(field))
            .await?;

        info!(
            "Staged {} byte {} thumbnail for video {}",
            staged.size,
            image_type.mime_type(),
            video_id
        );

        let previous = video.clone();
        video.thumbnail_url = Some(staged.reference.clone());
        video.updated_at = OffsetDateTime::now_utc();

        if let Err(e) = state.videos.update_video(&video).await {
            state.thumbnails.discard(staged).await;
            return Err(ThumbnailError::storage("Couldn't update video in db")(e));
        }

        if let Err(e) = state.thumbnails.commit(staged).await {
            if let Err(restore) = state.videos.update_video(&previous).await {
                error!("Failed to restore video {} after storage error: {}", video_id, restore);
            }
            return Err(e.into());
        }

        Ok(video)
    }
}
