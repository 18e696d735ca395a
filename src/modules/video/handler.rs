use super::service::ThumbnailService;
use crate::common::response::ApiSuccess;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

/// Upload Video Thumbnail
/// Stores a JPEG or PNG thumbnail and returns the updated video
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/thumbnail",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "File part named `thumbnail`"),
    responses(
        (status = 200, description = "Thumbnail stored", body = crate::modules::video::model::Video),
        (status = 400, description = "Bad Request", body = crate::common::response::ErrorBody),
        (status = 401, description = "Unauthorized or not the owner", body = crate::common::response::ErrorBody),
        (status = 415, description = "Unsupported Media Type", body = crate::common::response::ErrorBody),
        (status = 500, description = "Internal Server Error", body = crate::common::response::ErrorBody)
    ),
    tag = "Videos",
    security(("bearer_auth" = []))
)]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    match ThumbnailService::upload_thumbnail(&state, &video_id, &headers, multipart).await {
        Ok(video) => ApiSuccess(video, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}
