//! Shared harness for the HTTP tests: in-memory store, temp assets root and
//! hand-built multipart bodies.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use tempfile::TempDir;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use tubely::{
    app::create_app,
    common::upload::MAX_UPLOAD_SIZE,
    config::settings::{AppConfig, ThumbnailStorageKind},
    infrastructure::storage,
    modules::{
        auth::service::AuthService,
        video::{
            model::Video,
            repository::{RepositoryError, VideoStore},
        },
    },
    state::AppState,
};
use uuid::Uuid;

pub const SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "tubely-test-boundary";

#[derive(Default)]
pub struct MemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
    updates: Mutex<u32>,
}

impl MemoryVideoStore {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn update_count(&self) -> u32 {
        *self.updates.lock().unwrap()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Video, RepositoryError> {
        self.get(id).ok_or(RepositoryError::NotFound(id))
    }

    async fn update_video(&self, video: &Video) -> Result<(), RepositoryError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        *self.updates.lock().unwrap() += 1;

        let mut videos = self.videos.lock().unwrap();
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(video.id)),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryVideoStore>,
    pub assets: TempDir,
}

impl TestApp {
    pub async fn new(kind: ThumbnailStorageKind) -> Self {
        let assets = tempfile::tempdir().unwrap();
        let config = AppConfig {
            server_port: 8091,
            public_host: "localhost".to_string(),
            database_url: "postgres://unused".to_string(),
            jwt_secret: SECRET.to_string(),
            assets_root: assets.path().to_path_buf(),
            thumbnail_storage: kind,
        };

        let thumbnails = storage::from_config(&config, MAX_UPLOAD_SIZE).await.unwrap();
        let store = Arc::new(MemoryVideoStore::default());
        let state = AppState::new(config, store.clone(), thumbnails);

        Self {
            router: create_app(state),
            store,
            assets,
        }
    }

    /// Seeds a video owned by `owner` without a thumbnail.
    pub fn seed_video(&self, owner: Uuid) -> Video {
        let now = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
        let video = Video {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: "Boot.dev beats".to_string(),
            description: "A video about uploads".to_string(),
            thumbnail_url: None,
            video_url: None,
            user_id: owner,
        };
        self.store.insert(video.clone());
        video
    }

    pub fn asset_path(&self, file_name: &str) -> PathBuf {
        self.assets.path().join(file_name)
    }

    pub fn asset_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.assets.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn upload(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(request).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

pub fn token_for(user_id: Uuid) -> String {
    AuthService::make_jwt(user_id, SECRET, Duration::hours(1)).unwrap()
}

/// Single-part form body. `content_type: None` omits the part header.
pub fn form(field: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"thumb.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Form with a plain text field ahead of the file part.
pub fn form_with_title(content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n");
    let file_part = form("thumbnail", Some(content_type), data);
    body.extend_from_slice(&file_part);
    body
}

pub fn upload_request(video_id: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/api/videos/{}/thumbnail", video_id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Eight-byte PNG signature followed by filler.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend((0..len.saturating_sub(8)).map(|i| (i % 251) as u8));
    data.truncate(len);
    data
}
