//! Room Service - rooms and their amenities, always through the owning property

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::amenities::{AmenityInput, resolve_amenities, resolve_amenity};
use super::{collect_owned_media, load_owned_property, load_owned_room, load_visible_property};
use crate::domain::{
    AmenityCatalog, DomainError, MediaRepository, PropertyRepository, Room, RoomRepository,
    RoomScope, RoomType, User,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomInput {
    pub room_type: String,
    pub price: f64,
    pub capacity: i32,
    pub description: Option<String>,
    pub is_available: Option<bool>,
    #[serde(default)]
    pub amenities: Vec<AmenityInput>,
    /// Existing media (owned by the same user) to move onto the new room
    #[serde(default)]
    pub media_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomInput {
    pub room_type: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
    pub amenities: Option<Vec<AmenityInput>>,
    pub media_ids: Option<Vec<String>>,
}

/// A custom amenity to put on a room, found by name or created on the spot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAmenityInput {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub custom_description: Option<String>,
}

pub struct RoomService {
    properties: Arc<dyn PropertyRepository>,
    rooms: Arc<dyn RoomRepository>,
    media: Arc<dyn MediaRepository>,
    amenities: Arc<dyn AmenityCatalog<RoomScope>>,
}

impl RoomService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        rooms: Arc<dyn RoomRepository>,
        media: Arc<dyn MediaRepository>,
        amenities: Arc<dyn AmenityCatalog<RoomScope>>,
    ) -> Self {
        Self {
            properties,
            rooms,
            media,
            amenities,
        }
    }

    pub async fn add_room(
        &self,
        user: &User,
        property_id: &str,
        input: RoomInput,
    ) -> Result<Room, DomainError> {
        let mut property = load_owned_property(self.properties.as_ref(), user, property_id).await?;

        let room_type: RoomType = input.room_type.parse()?;
        let mut room = Room::new(
            property.id.clone(),
            room_type,
            input.price,
            input.capacity,
            input.description,
        )?;
        if let Some(available) = input.is_available {
            room.set_available(available);
        }
        for amenity in resolve_amenities(self.amenities.as_ref(), input.amenities).await? {
            room.add_amenity(amenity);
        }
        let media = collect_owned_media(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            self.media.as_ref(),
            user,
            &[],
            input.media_ids,
        )
        .await?;
        for m in media {
            room.add_media(m);
        }

        // Rejects inactive properties before anything is written
        property.add_room(room.clone())?;

        let saved = self.rooms.save(&room).await?;
        info!(room_id = %saved.id, property_id, "Added room");
        Ok(saved)
    }

    pub async fn update_room(
        &self,
        user: &User,
        room_id: &str,
        input: UpdateRoomInput,
    ) -> Result<Room, DomainError> {
        let mut room = load_owned_room(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            user,
            room_id,
        )
        .await?;

        if let Some(room_type) = input.room_type {
            room.room_type = room_type.parse()?;
        }
        if let Some(price) = input.price {
            room.update_price(price)?;
        }
        if let Some(capacity) = input.capacity {
            room.update_capacity(capacity)?;
        }
        if let Some(description) = input.description {
            room.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(available) = input.is_available {
            room.set_available(available);
        }
        if let Some(amenities) = input.amenities {
            room.amenities = resolve_amenities(self.amenities.as_ref(), amenities).await?;
        }
        if let Some(media_ids) = input.media_ids {
            room.media = collect_owned_media(
                self.properties.as_ref(),
                self.rooms.as_ref(),
                self.media.as_ref(),
                user,
                &room.media,
                media_ids,
            )
            .await?;
        }

        self.rooms.save(&room).await
    }

    pub async fn delete_room(&self, user: &User, room_id: &str) -> Result<(), DomainError> {
        load_owned_room(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            user,
            room_id,
        )
        .await?;
        self.rooms.delete(room_id).await?;
        info!(room_id, "Deleted room");
        Ok(())
    }

    /// Rooms share the visibility of their property: a room of someone
    /// else's unpublished property is `NotFound`.
    pub async fn get_room(
        &self,
        viewer: Option<&User>,
        room_id: &str,
    ) -> Result<Room, DomainError> {
        let room = self
            .rooms
            .get_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;

        load_visible_property(self.properties.as_ref(), viewer, &room.property_id)
            .await
            .map_err(|e| match e {
                DomainError::NotFound(_) => DomainError::not_found("Room", room_id),
                other => other,
            })?;
        Ok(room)
    }

    pub async fn list_rooms(
        &self,
        viewer: Option<&User>,
        property_id: &str,
    ) -> Result<Vec<Room>, DomainError> {
        load_visible_property(self.properties.as_ref(), viewer, property_id).await?;
        self.rooms.get_by_property(property_id).await
    }

    /// Link a custom amenity by name, reusing a catalog entry with the same
    /// name (case-insensitive) when there is one.
    pub async fn add_new_amenity(
        &self,
        user: &User,
        room_id: &str,
        input: NewAmenityInput,
    ) -> Result<Room, DomainError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("Amenity name must not be empty"));
        }
        let mut room = load_owned_room(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            user,
            room_id,
        )
        .await?;

        let amenity = resolve_amenity(
            self.amenities.as_ref(),
            AmenityInput {
                id: None,
                name: Some(input.name),
                category: input.category,
                description: input.description,
                custom_description: input.custom_description,
            },
        )
        .await?;
        room.add_amenity(amenity);

        self.rooms.save(&room).await
    }

    pub async fn remove_room_amenity(
        &self,
        user: &User,
        room_id: &str,
        amenity_id: &str,
    ) -> Result<Room, DomainError> {
        let mut room = load_owned_room(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            user,
            room_id,
        )
        .await?;

        if !room.remove_amenity(amenity_id) {
            return Err(DomainError::NotFound(format!(
                "Amenity {} on room {}",
                amenity_id, room_id
            )));
        }
        self.rooms.save(&room).await
    }
}
