use crate::common::upload::{MAX_FORM_OVERHEAD, MAX_UPLOAD_SIZE};
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;

pub mod error;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/videos/{video_id}/thumbnail",
        post(handler::upload_thumbnail)
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MAX_FORM_OVERHEAD)),
    )
}
