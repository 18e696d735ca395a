use axum::{
    extract::multipart::{Field, MultipartError, MultipartRejection},
    http::{HeaderValue, header},
};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use mime::Mime;
use std::{io, pin::Pin};
use thiserror::Error;

/// Ceiling for the thumbnail payload, 10 MiB.
pub const MAX_UPLOAD_SIZE: usize = 10 << 20;

/// Room for multipart boundaries, part headers and small text fields on top
/// of the payload. The payload itself is counted by the storage backend.
pub const MAX_FORM_OVERHEAD: usize = 64 * 1024;

/// Form field carrying the thumbnail file.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Chunked upload body handed to a storage backend.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Couldn't parse multipart form")]
    Rejection(#[from] MultipartRejection),
    #[error("Couldn't parse multipart form")]
    Multipart(#[from] MultipartError),
    #[error("Couldn't get file `{0}` from form")]
    MissingField(&'static str),
    #[error("Missing or invalid Content-Type for file")]
    InvalidContentType(#[source] Option<mime::FromStrError>),
    #[error("Unsupported media type {0}, expected image/jpeg or image/png")]
    UnsupportedMediaType(String),
    #[error("Couldn't read file")]
    Read(#[source] io::Error),
    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
}

/// Image formats accepted as thumbnails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    /// Parses a part's `Content-Type`, ignoring parameters such as `charset`.
    pub fn from_content_type(value: Option<&HeaderValue>) -> Result<Self, UploadError> {
        let raw = value
            .and_then(|v| v.to_str().ok())
            .ok_or(UploadError::InvalidContentType(None))?;

        let parsed: Mime = raw
            .trim()
            .parse()
            .map_err(|e| UploadError::InvalidContentType(Some(e)))?;

        let essence = parsed.essence_str().to_ascii_lowercase();
        if essence == mime::IMAGE_JPEG.essence_str() {
            Ok(ImageType::Jpeg)
        } else if essence == mime::IMAGE_PNG.essence_str() {
            Ok(ImageType::Png)
        } else {
            Err(UploadError::UnsupportedMediaType(essence))
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpg",
            ImageType::Png => "png",
        }
    }
}

pub fn into_byte_stream(field: Field<'_>) -> ByteStream<'_> {
    Box::pin(field.map(|chunk| chunk.map_err(io::Error::other)))
}

/// `Content-Type` header of a multipart part, as sent by the client.
pub fn declared_content_type<'f>(field: &'f Field<'_>) -> Option<&'f HeaderValue> {
    field.headers().get(header::CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ImageType, UploadError> {
        ImageType::from_content_type(Some(&HeaderValue::from_str(raw).unwrap()))
    }

    #[test]
    fn accepts_jpeg_and_png() {
        assert_eq!(parse("image/jpeg").unwrap(), ImageType::Jpeg);
        assert_eq!(parse("image/png").unwrap(), ImageType::Png);
    }

    #[test]
    fn strips_parameters_and_case() {
        assert_eq!(parse("IMAGE/PNG; charset=binary").unwrap(), ImageType::Png);
        assert_eq!(parse(" image/jpeg ").unwrap(), ImageType::Jpeg);
    }

    #[test]
    fn rejects_other_images_as_unsupported() {
        match parse("image/gif") {
            Err(UploadError::UnsupportedMediaType(t)) => assert_eq!(t, "image/gif"),
            other => panic!("expected unsupported media type, got {:?}", other),
        }
        assert!(matches!(
            parse("image/jpg"),
            Err(UploadError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn rejects_garbage_as_invalid() {
        assert!(matches!(
            parse("imagepng"),
            Err(UploadError::InvalidContentType(Some(_)))
        ));
        assert!(matches!(
            ImageType::from_content_type(None),
            Err(UploadError::InvalidContentType(None))
        ));
    }

    #[test]
    fn maps_extensions() {
        assert_eq!(ImageType::Jpeg.extension(), "jpg");
        assert_eq!(ImageType::Png.extension(), "png");
        assert_eq!(ImageType::Png.mime_type(), "image/png");
    }
}
