use crate::config::env::{self, EnvKey};
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Where uploaded thumbnails end up. One variant is active per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbnailStorageKind {
    /// Base64 data URI stored on the video record itself.
    Embedded,
    /// File under the assets root, referenced by URL.
    File,
}

impl FromStr for ThumbnailStorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedded" | "data-uri" => Ok(ThumbnailStorageKind::Embedded),
            "file" | "local" => Ok(ThumbnailStorageKind::File),
            other => Err(anyhow!(
                "unknown thumbnail storage `{}`, expected `file` or `embedded`",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub public_host: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub assets_root: PathBuf,
    pub thumbnail_storage: ThumbnailStorageKind,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let thumbnail_storage = env::get_or(EnvKey::ThumbnailStorage, "file")
            .parse()
            .with_context(|| format!("reading {}", EnvKey::ThumbnailStorage.as_str()))?;

        let config = Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 8091),
            public_host: env::get_or(EnvKey::PublicHost, "localhost"),
            database_url: env::get(EnvKey::DatabaseUrl)
                .with_context(|| format!("reading {}", EnvKey::DatabaseUrl.as_str()))?,
            jwt_secret: env::get(EnvKey::JwtSecret)
                .with_context(|| format!("reading {}", EnvKey::JwtSecret.as_str()))?,
            assets_root: PathBuf::from(env::get_or(EnvKey::AssetsRoot, "./assets")),
            thumbnail_storage,
        };

        // Fail at startup rather than on the first upload.
        config.assets_base_url()?;
        Ok(config)
    }

    /// Public base URL of the static assets route, always ending in `/assets/`.
    pub fn assets_base_url(&self) -> Result<Url> {
        let raw = format!("http://{}:{}/assets/", self.public_host, self.server_port);
        Url::parse(&raw).with_context(|| format!("building assets URL from `{}`", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> AppConfig {
        AppConfig {
            server_port: 8091,
            public_host: host.to_string(),
            database_url: "postgres://localhost/tubely".to_string(),
            jwt_secret: "secret".to_string(),
            assets_root: PathBuf::from("./assets"),
            thumbnail_storage: ThumbnailStorageKind::File,
        }
    }

    #[test]
    fn parses_storage_kind() {
        assert_eq!("file".parse::<ThumbnailStorageKind>().unwrap(), ThumbnailStorageKind::File);
        assert_eq!(
            " Embedded ".parse::<ThumbnailStorageKind>().unwrap(),
            ThumbnailStorageKind::Embedded
        );
        assert!("s3".parse::<ThumbnailStorageKind>().is_err());
    }

    #[test]
    fn assets_url_includes_host_and_port() {
        let url = config("localhost").assets_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8091/assets/");
    }

    #[test]
    fn rejects_unusable_host() {
        assert!(config("bad host").assets_base_url().is_err());
    }
}
