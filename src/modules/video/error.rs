use super::repository::RepositoryError;
use crate::common::response::ApiError;
use crate::common::upload::UploadError;
use crate::infrastructure::storage::StorageError;
use crate::modules::auth::service::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as _;
use thiserror::Error;
use tracing::{error, warn};

/// Everything that can end a thumbnail upload early.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Invalid ID")]
    InvalidIdentifier(#[source] uuid::Error),
    #[error("Couldn't find JWT")]
    MissingCredential(#[source] AuthError),
    #[error("Couldn't validate JWT")]
    InvalidCredential(#[source] AuthError),
    #[error("{0}")]
    MalformedUpload(#[source] UploadError),
    #[error("Unsupported media type {0}, expected image/jpeg or image/png")]
    UnsupportedMediaType(String),
    #[error("User is not the owner of the video")]
    Forbidden,
    #[error("{context}")]
    StorageUnavailable {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ThumbnailError {
    pub fn status(&self) -> StatusCode {
        match self {
            ThumbnailError::InvalidIdentifier(_) | ThumbnailError::MalformedUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            ThumbnailError::MissingCredential(_)
            | ThumbnailError::InvalidCredential(_)
            // Kept at 401 rather than 403 for existing clients.
            | ThumbnailError::Forbidden => StatusCode::UNAUTHORIZED,
            ThumbnailError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ThumbnailError::StorageUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn storage(
        context: &'static str,
    ) -> impl FnOnce(RepositoryError) -> ThumbnailError {
        move |e| ThumbnailError::StorageUnavailable {
            context,
            source: Box::new(e),
        }
    }

    fn cause(&self) -> String {
        let mut chain = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain.join(": ")
    }
}

impl From<UploadError> for ThumbnailError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedMediaType(media_type) => {
                ThumbnailError::UnsupportedMediaType(media_type)
            }
            other => ThumbnailError::MalformedUpload(other),
        }
    }
}

impl From<StorageError> for ThumbnailError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Stream(e) => ThumbnailError::MalformedUpload(UploadError::Read(e)),
            StorageError::TooLarge { limit } => {
                ThumbnailError::MalformedUpload(UploadError::TooLarge { limit })
            }
            StorageError::Io(e) => ThumbnailError::StorageUnavailable {
                context: "Couldn't save thumbnail",
                source: Box::new(e),
            },
        }
    }
}

impl IntoResponse for ThumbnailError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), cause = %self.cause(), "{}", self);
        } else {
            warn!(status = status.as_u16(), cause = %self.cause(), "{}", self);
        }

        ApiError(self.to_string(), status).into_response()
    }
}
