use crate::config::settings::AppConfig;
use crate::infrastructure::storage::ThumbnailStorage;
use crate::modules::video::repository::VideoStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub videos: Arc<dyn VideoStore>,
    pub thumbnails: Arc<dyn ThumbnailStorage>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        videos: Arc<dyn VideoStore>,
        thumbnails: Arc<dyn ThumbnailStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            videos,
            thumbnails,
        }
    }
}
