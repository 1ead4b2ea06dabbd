//! Services Layer
//!
//! Use-case orchestration on top of the repositories: ownership checks,
//! amenity resolution and media attachment. HTTP handlers call into these.

pub mod amenities;
pub mod media_service;
pub mod property_service;
pub mod room_service;
pub mod search_service;

pub use amenities::{AmenityInput, resolve_amenities, resolve_amenity};
pub use media_service::{MediaService, UploadMediaInput};
pub use property_service::{CreatePropertyInput, PropertyService, UpdatePropertyInput};
pub use room_service::{NewAmenityInput, RoomInput, RoomService, UpdateRoomInput};
pub use search_service::SearchService;

use crate::domain::{
    DomainError, Media, MediaParent, MediaRepository, Property, PropertyRepository,
    PropertyStatus, Room, RoomRepository, User,
};

/// Load a property the acting user owns.
///
/// A missing property is `NotFound` whoever asks; an existing property owned
/// by someone else is `Unauthorized`.
pub(crate) async fn load_owned_property(
    properties: &dyn PropertyRepository,
    user: &User,
    property_id: &str,
) -> Result<Property, DomainError> {
    let property = properties
        .get_by_id(property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property", property_id))?;

    if !property.is_owned_by(&user.id) {
        tracing::debug!(property_id, user_id = %user.id, "Ownership check failed");
        return Err(DomainError::Unauthorized);
    }
    Ok(property)
}

/// Load a room whose parent property the acting user owns.
pub(crate) async fn load_owned_room(
    properties: &dyn PropertyRepository,
    rooms: &dyn RoomRepository,
    user: &User,
    room_id: &str,
) -> Result<Room, DomainError> {
    let room = rooms
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Room", room_id))?;

    let property = properties.get_by_id(&room.property_id).await?.ok_or_else(|| {
        DomainError::Consistency(format!(
            "Room {} points at missing property {}",
            room.id, room.property_id
        ))
    })?;

    if !property.is_owned_by(&user.id) {
        tracing::debug!(room_id, user_id = %user.id, "Ownership check failed");
        return Err(DomainError::Unauthorized);
    }
    Ok(room)
}

/// Load a property as `viewer` may see it.
///
/// Published properties are visible to anyone. Any other state is reported as
/// `NotFound` to everyone but the owner, so drafts do not leak their existence.
pub(crate) async fn load_visible_property(
    properties: &dyn PropertyRepository,
    viewer: Option<&User>,
    property_id: &str,
) -> Result<Property, DomainError> {
    let property = properties
        .get_by_id(property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property", property_id))?;

    let is_owner = viewer.is_some_and(|u| property.is_owned_by(&u.id));
    if property.status != PropertyStatus::Published && !is_owner {
        return Err(DomainError::not_found("Property", property_id));
    }
    Ok(property)
}

/// Media the user may attach: it must exist and hang off something they own.
async fn load_owned_media(
    properties: &dyn PropertyRepository,
    rooms: &dyn RoomRepository,
    media: &dyn MediaRepository,
    user: &User,
    media_id: &str,
) -> Result<Media, DomainError> {
    let found = media
        .get_by_id(media_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Media", media_id))?;

    match media.get_parent(media_id).await? {
        Some(MediaParent::Property(id)) => {
            load_owned_property(properties, user, &id).await?;
        }
        Some(MediaParent::Room(id)) => {
            load_owned_room(properties, rooms, user, &id).await?;
        }
        None => {
            return Err(DomainError::Consistency(format!(
                "Media {} has no parent",
                media_id
            )));
        }
    }
    Ok(found)
}

/// A media collection after replacing it with `media_ids`.
///
/// Ids already in `current` are kept as they are; any other id must name
/// media the user owns elsewhere, which then moves here on save.
pub(crate) async fn collect_owned_media(
    properties: &dyn PropertyRepository,
    rooms: &dyn RoomRepository,
    media: &dyn MediaRepository,
    user: &User,
    current: &[Media],
    media_ids: Vec<String>,
) -> Result<Vec<Media>, DomainError> {
    let mut result: Vec<Media> = Vec::with_capacity(media_ids.len());
    for id in media_ids {
        if result.iter().any(|m| m.id == id) {
            continue;
        }
        match current.iter().find(|m| m.id == id) {
            Some(m) => result.push(m.clone()),
            None => result.push(load_owned_media(properties, rooms, media, user, &id).await?),
        }
    }
    Ok(result)
}
