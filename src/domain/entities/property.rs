use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::amenity::{PropertyAmenity, push_unique};
use super::media::Media;
use super::room::Room;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Draft,
    Published,
    Inactive,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Draft => "DRAFT",
            PropertyStatus::Published => "PUBLISHED",
            PropertyStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(PropertyStatus::Draft),
            "PUBLISHED" => Ok(PropertyStatus::Published),
            "INACTIVE" => Ok(PropertyStatus::Inactive),
            other => Err(DomainError::Validation(format!(
                "Unknown property status '{}'",
                other
            ))),
        }
    }
}

/// Eligibility rule for DRAFT -> PUBLISHED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishPolicy {
    pub min_rooms: usize,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self { min_rooms: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub description: Option<String>,
    pub status: PropertyStatus,
    pub rooms: Vec<Room>,
    pub amenities: Vec<PropertyAmenity>,
    pub media: Vec<Media>,
}

impl Property {
    /// A new DRAFT listing with a fresh id and no children.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let property = Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            address: address.into(),
            city: city.into(),
            country: country.into(),
            description,
            status: PropertyStatus::Draft,
            rooms: Vec::new(),
            amenities: Vec::new(),
            media: Vec::new(),
        };
        property.validate()?;
        Ok(property)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Property name must not be empty"));
        }
        if self.owner_id.trim().is_empty() {
            return Err(DomainError::validation("Property must have an owner"));
        }
        for room in &self.rooms {
            if room.property_id != self.id {
                return Err(DomainError::Validation(format!(
                    "Room {} belongs to property {}, not {}",
                    room.id, room.property_id, self.id
                )));
            }
            room.validate()?;
        }
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn can_be_published(&self, policy: &PublishPolicy) -> bool {
        self.status != PropertyStatus::Inactive && self.rooms.len() >= policy.min_rooms
    }

    /// DRAFT -> PUBLISHED. Publishing a PUBLISHED property is a no-op.
    pub fn publish(&mut self, policy: &PublishPolicy) -> Result<(), DomainError> {
        match self.status {
            PropertyStatus::Published => Ok(()),
            PropertyStatus::Inactive => Err(DomainError::validation(
                "Cannot publish an inactive property",
            )),
            PropertyStatus::Draft => {
                if !self.can_be_published(policy) {
                    return Err(DomainError::Validation(format!(
                        "Cannot publish property with {} room(s); at least {} required",
                        self.rooms.len(),
                        policy.min_rooms
                    )));
                }
                self.status = PropertyStatus::Published;
                Ok(())
            }
        }
    }

    /// PUBLISHED -> DRAFT. A DRAFT property stays as it is.
    pub fn unpublish(&mut self) -> Result<(), DomainError> {
        match self.status {
            PropertyStatus::Published | PropertyStatus::Draft => {
                self.status = PropertyStatus::Draft;
                Ok(())
            }
            PropertyStatus::Inactive => Err(DomainError::validation(
                "Cannot unpublish an inactive property",
            )),
        }
    }

    /// Any status -> INACTIVE.
    pub fn archive(&mut self) {
        self.status = PropertyStatus::Inactive;
    }

    pub fn add_room(&mut self, room: Room) -> Result<(), DomainError> {
        if self.status == PropertyStatus::Inactive {
            return Err(DomainError::validation(
                "Cannot add rooms to inactive property",
            ));
        }
        if room.property_id != self.id {
            return Err(DomainError::Validation(format!(
                "Room {} does not belong to property {}",
                room.id, self.id
            )));
        }
        room.validate()?;

        match self.rooms.iter_mut().find(|r| r.id == room.id) {
            Some(existing) => *existing = room,
            None => self.rooms.push(room),
        }
        Ok(())
    }

    pub fn remove_room(&mut self, room_id: &str) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != room_id);
        before != self.rooms.len()
    }

    pub fn add_amenity(&mut self, amenity: PropertyAmenity) {
        push_unique(&mut self.amenities, amenity);
    }

    pub fn remove_amenity(&mut self, amenity_id: &str) -> bool {
        let before = self.amenities.len();
        self.amenities.retain(|a| a.id != amenity_id);
        before != self.amenities.len()
    }

    pub fn add_media(&mut self, media: Media) {
        if !self.media.iter().any(|m| m.id == media.id) {
            self.media.push(media);
        }
    }

    pub fn remove_media(&mut self, media_id: &str) -> bool {
        let before = self.media.len();
        self.media.retain(|m| m.id != media_id);
        before != self.media.len()
    }
}
