//! Application state containing repositories, services and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    AmenityCatalog, MediaRepository, MediaStorage, PropertyRepository, PropertyScope,
    RoomRepository, RoomScope, UserRepository,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::storage::build_storage;
use crate::infrastructure::{
    SeaOrmMediaRepository, SeaOrmPropertyAmenityCatalog, SeaOrmPropertyRepository,
    SeaOrmRoomAmenityCatalog, SeaOrmRoomRepository, SeaOrmUserRepository,
};
use crate::services::{MediaService, PropertyService, RoomService, SearchService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub property_repo: Arc<dyn PropertyRepository>,
    pub room_repo: Arc<dyn RoomRepository>,
    pub media_repo: Arc<dyn MediaRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub property_amenities: Arc<dyn AmenityCatalog<PropertyScope>>,
    pub room_amenities: Arc<dyn AmenityCatalog<RoomScope>>,
    /// Object store selected by configuration
    pub storage: Arc<dyn MediaStorage>,
    pub property_service: Arc<PropertyService>,
    pub room_service: Arc<RoomService>,
    pub media_service: Arc<MediaService>,
    pub search_service: Arc<SearchService>,
}

impl AppState {
    /// Create a new AppState, building the storage variant named in `config`
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self::with_storage(db, config, build_storage(&config.storage))
    }

    /// Same as `new`, with an explicit object store
    pub fn with_storage(
        db: DatabaseConnection,
        config: &Config,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        let property_repo: Arc<dyn PropertyRepository> =
            Arc::new(SeaOrmPropertyRepository::new(db.clone(), storage.clone()));
        let room_repo: Arc<dyn RoomRepository> =
            Arc::new(SeaOrmRoomRepository::new(db.clone(), storage.clone()));
        let media_repo: Arc<dyn MediaRepository> =
            Arc::new(SeaOrmMediaRepository::new(db.clone(), storage.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository::new(db.clone()));
        let property_amenities: Arc<dyn AmenityCatalog<PropertyScope>> =
            Arc::new(SeaOrmPropertyAmenityCatalog::new(db.clone()));
        let room_amenities: Arc<dyn AmenityCatalog<RoomScope>> =
            Arc::new(SeaOrmRoomAmenityCatalog::new(db));

        let property_service = Arc::new(PropertyService::new(
            property_repo.clone(),
            room_repo.clone(),
            media_repo.clone(),
            property_amenities.clone(),
            config.publish_policy,
        ));
        let room_service = Arc::new(RoomService::new(
            property_repo.clone(),
            room_repo.clone(),
            media_repo.clone(),
            room_amenities.clone(),
        ));
        let media_service = Arc::new(MediaService::new(
            media_repo.clone(),
            property_repo.clone(),
            room_repo.clone(),
        ));
        let search_service = Arc::new(SearchService::new(property_repo.clone()));

        Self {
            property_repo,
            room_repo,
            media_repo,
            user_repo,
            property_amenities,
            room_amenities,
            storage,
            property_service,
            room_service,
            media_service,
            search_service,
        }
    }
}
