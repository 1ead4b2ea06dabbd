use std::env;
use std::path::PathBuf;

use crate::domain::PublishPolicy;

/// Which object store backs media uploads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Filesystem { root: PathBuf },
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub storage: StorageBackend,
    pub publish_policy: PublishPolicy,
    pub seed_global_amenities: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://roomkeeper.db?mode=rwc".to_string());

        let storage = match env::var("MEDIA_STORAGE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::Filesystem {
                root: env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("media")),
            },
        };

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            storage,
            publish_policy: PublishPolicy {
                min_rooms: env::var("PUBLISH_MIN_ROOMS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1),
            },
            seed_global_amenities: env::var("SEED_GLOBAL_AMENITIES")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// In-memory database and object store, used by tests and local demos.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
            storage: StorageBackend::Memory,
            publish_policy: PublishPolicy::default(),
            seed_global_amenities: true,
        }
    }
}
