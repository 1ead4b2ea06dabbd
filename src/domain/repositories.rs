//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use super::errors::StorageError;
use super::entities::{
    Amenity, AmenityScope, Media, MediaParent, MediaUpload, Property, Room, User,
};

/// Filter criteria for guest search over published listings
#[derive(Debug, Default, Clone)]
pub struct PropertySearch {
    pub location: Option<String>,
    pub limit: Option<u64>,
}

/// Repository trait for the Property aggregate (property, rooms, links, media)
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Find a fully hydrated property by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Property>, DomainError>;

    /// All properties of one owner
    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, DomainError>;

    /// Published properties, newest first, optionally matching a location
    async fn search_published(&self, filter: PropertySearch)
    -> Result<Vec<Property>, DomainError>;

    /// Insert or reconcile the whole aggregate, returning the re-read state
    async fn save(&self, property: &Property) -> Result<Property, DomainError>;

    /// Delete a property together with everything it owns
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Repository trait for the Room aggregate (room, links, media)
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Room>, DomainError>;

    async fn get_by_property(&self, property_id: &str) -> Result<Vec<Room>, DomainError>;

    /// Rooms across every property of one owner
    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Room>, DomainError>;

    async fn save(&self, room: &Room) -> Result<Room, DomainError>;

    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// One amenity catalog (property or room scope)
#[async_trait]
pub trait AmenityCatalog<S: AmenityScope>: Send + Sync {
    /// Insert a new entry or update name/category/description of an existing one.
    /// `is_global` is fixed at creation.
    async fn save(&self, amenity: Amenity<S>) -> Result<Amenity<S>, DomainError>;

    /// Delete an entry together with every link that references it
    async fn delete(&self, id: &str) -> Result<(), DomainError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Amenity<S>>, DomainError>;

    /// Case-insensitive exact name lookup
    async fn get_by_name(&self, name: &str) -> Result<Option<Amenity<S>>, DomainError>;

    async fn list_global(&self) -> Result<Vec<Amenity<S>>, DomainError>;
}

/// Repository trait for media metadata plus the physical objects behind it
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Validate the parent, write bytes to storage, then persist metadata
    async fn upload(&self, upload: MediaUpload) -> Result<Media, DomainError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Media>, DomainError>;

    /// The parent a media row is attached to
    async fn get_parent(&self, id: &str) -> Result<Option<MediaParent>, DomainError>;

    async fn list_by_parent(&self, parent: &MediaParent) -> Result<Vec<Media>, DomainError>;

    /// Delete metadata, then the physical object once the delete has committed
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Repository trait for users known through the identity provider
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, DomainError>;

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError>;

    /// Create the user on first sight; an existing user is returned unchanged
    async fn upsert_from_identity(
        &self,
        external_id: &str,
        email: &str,
        name: &str,
    ) -> Result<User, DomainError>;
}

/// External object store holding media bytes
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store bytes under `name` and return the opaque storage path
    async fn store(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Delete the object at `path`; a missing object is not an error
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}
