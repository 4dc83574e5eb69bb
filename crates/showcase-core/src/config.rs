//! Configuration module
//!
//! Process configuration loaded from the environment (and an optional `.env`
//! file). Site content settings live in [`crate::models::SiteSettings`] instead.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const DB_MAX_CONNECTIONS: u32 = 10;
const IMAGE_MAX_FILE_SIZE_MB: u64 = 5;
const IMAGE_MAX_DIMENSION: u32 = 4096;
const HERO_MIN_WIDTH: u32 = 1200;
const HERO_ASPECT_TOLERANCE: f64 = 0.10;
const VIDEO_MAX_FILE_SIZE_MB: u64 = 50;
const JPEG_QUALITY: u8 = 82;
const WEBP_QUALITY: f32 = 80.0;
const CACHE_TTL_SECS: u64 = 3600;
const CACHE_CAPACITY: usize = 1024;

/// Blob storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: Option<String>,
    pub local_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub s3_endpoint: Option<String>,
}

/// Upload limits and encoder settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub image_max_file_size_bytes: u64,
    pub image_max_dimension: u32,
    pub hero_min_width: u32,
    pub hero_aspect_tolerance: f64,
    pub video_max_file_size_bytes: u64,
    pub ffmpeg_path: String,
    pub jpeg_quality: u8,
    pub webp_quality: f32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_max_file_size_bytes: IMAGE_MAX_FILE_SIZE_MB * 1024 * 1024,
            image_max_dimension: IMAGE_MAX_DIMENSION,
            hero_min_width: HERO_MIN_WIDTH,
            hero_aspect_tolerance: HERO_ASPECT_TOLERANCE,
            video_max_file_size_bytes: VIDEO_MAX_FILE_SIZE_MB * 1024 * 1024,
            ffmpeg_path: "ffmpeg".to_string(),
            jpeg_quality: JPEG_QUALITY,
            webp_quality: WEBP_QUALITY,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// When unset the server falls back to in-memory repositories.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub storage: StorageConfig,
    pub media: MediaConfig,
    pub public_base_url: String,
    pub sitemap_path: PathBuf,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    pub log_format: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let storage = StorageConfig {
            backend,
            local_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string()),
            ),
            local_base_url: Some(
                env::var("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/storage".to_string()),
            ),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
        };

        let media = MediaConfig {
            image_max_file_size_bytes: env_or("IMAGE_MAX_FILE_SIZE_MB", IMAGE_MAX_FILE_SIZE_MB)
                * 1024
                * 1024,
            image_max_dimension: env_or("IMAGE_MAX_DIMENSION", IMAGE_MAX_DIMENSION),
            hero_min_width: env_or("HERO_MIN_WIDTH", HERO_MIN_WIDTH),
            hero_aspect_tolerance: env_or("HERO_ASPECT_TOLERANCE", HERO_ASPECT_TOLERANCE),
            video_max_file_size_bytes: env_or("VIDEO_MAX_FILE_SIZE_MB", VIDEO_MAX_FILE_SIZE_MB)
                * 1024
                * 1024,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            jpeg_quality: env_or("JPEG_QUALITY", JPEG_QUALITY),
            webp_quality: env_or("WEBP_QUALITY", WEBP_QUALITY),
        };

        Ok(Config {
            server_port: env_or("SERVER_PORT", SERVER_PORT),
            environment,
            cors_origins,
            database_url: env_opt("DATABASE_URL"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS),
            storage,
            media,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            sitemap_path: PathBuf::from(
                env::var("SITEMAP_PATH").unwrap_or_else(|_| "./public/sitemap.xml".to_string()),
            ),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", CACHE_TTL_SECS),
            cache_capacity: env_or("CACHE_CAPACITY", CACHE_CAPACITY),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        } else if self.is_production() {
            return Err(anyhow::anyhow!("DATABASE_URL must be set in production"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.media.hero_min_width > self.media.image_max_dimension {
            return Err(anyhow::anyhow!(
                "HERO_MIN_WIDTH ({}) cannot exceed IMAGE_MAX_DIMENSION ({})",
                self.media.hero_min_width,
                self.media.image_max_dimension
            ));
        }

        if !(0.0..1.0).contains(&self.media.hero_aspect_tolerance) {
            return Err(anyhow::anyhow!(
                "HERO_ASPECT_TOLERANCE must be between 0 and 1"
            ));
        }

        if self.media.jpeg_quality == 0 || self.media.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG_QUALITY must be between 1 and 100"));
        }

        if !(1.0..=100.0).contains(&self.media.webp_quality) {
            return Err(anyhow::anyhow!("WEBP_QUALITY must be between 1 and 100"));
        }

        if self.cache_capacity == 0 {
            return Err(anyhow::anyhow!("CACHE_CAPACITY must be greater than zero"));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn log_json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_path: Some("./storage".to_string()),
                local_base_url: Some("http://localhost:3000/storage".to_string()),
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
            },
            media: MediaConfig::default(),
            public_base_url: "http://localhost:3000".to_string(),
            sitemap_path: PathBuf::from("./public/sitemap.xml"),
            cache_ttl_secs: CACHE_TTL_SECS,
            cache_capacity: CACHE_CAPACITY,
            log_format: "text".to_string(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut config = sample();
        config.storage.backend = StorageBackend::S3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));
    }

    #[test]
    fn test_production_requires_database() {
        let mut config = sample();
        config.environment = "production".to_string();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        config.database_url = Some("mysql://localhost/db".to_string());
        assert!(config.validate().is_err());

        config.database_url = Some("postgres://localhost/showcase".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hero_width_bounded_by_max_dimension() {
        let mut config = sample();
        config.media.hero_min_width = 5000;
        assert!(config.validate().is_err());
    }
}
