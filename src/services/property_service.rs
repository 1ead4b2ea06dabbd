//! Property Service - listing lifecycle for owners

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::amenities::{AmenityInput, resolve_amenities};
use super::{collect_owned_media, load_owned_property, load_visible_property};
use crate::domain::{
    AmenityCatalog, DomainError, Media, MediaRepository, Property, PropertyRepository,
    PropertyScope, PropertyStatus, PublishPolicy, RoomRepository, User,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePropertyInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<AmenityInput>,
    /// Existing media (owned by the same user) to move onto the new property
    #[serde(default)]
    pub media_ids: Vec<String>,
}

/// Partial update. `None` leaves a field untouched; a `Some` collection
/// replaces the whole collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePropertyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<AmenityInput>>,
    pub media_ids: Option<Vec<String>>,
}

pub struct PropertyService {
    properties: Arc<dyn PropertyRepository>,
    rooms: Arc<dyn RoomRepository>,
    media: Arc<dyn MediaRepository>,
    amenities: Arc<dyn AmenityCatalog<PropertyScope>>,
    policy: PublishPolicy,
}

impl PropertyService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        rooms: Arc<dyn RoomRepository>,
        media: Arc<dyn MediaRepository>,
        amenities: Arc<dyn AmenityCatalog<PropertyScope>>,
        policy: PublishPolicy,
    ) -> Self {
        Self {
            properties,
            rooms,
            media,
            amenities,
            policy,
        }
    }

    pub fn policy(&self) -> PublishPolicy {
        self.policy
    }

    async fn collect_media(
        &self,
        user: &User,
        current: &[Media],
        media_ids: Vec<String>,
    ) -> Result<Vec<Media>, DomainError> {
        collect_owned_media(
            self.properties.as_ref(),
            self.rooms.as_ref(),
            self.media.as_ref(),
            user,
            current,
            media_ids,
        )
        .await
    }

    pub async fn create_property(
        &self,
        user: &User,
        input: CreatePropertyInput,
    ) -> Result<Property, DomainError> {
        let mut property = Property::new(
            user.id.clone(),
            input.name.trim(),
            input.address.trim(),
            input.city.trim(),
            input.country.trim(),
            input.description,
        )?;

        for amenity in resolve_amenities(self.amenities.as_ref(), input.amenities).await? {
            property.add_amenity(amenity);
        }
        for media in self.collect_media(user, &[], input.media_ids).await? {
            property.add_media(media);
        }

        let saved = self.properties.save(&property).await?;
        info!(property_id = %saved.id, owner_id = %user.id, "Created property");
        Ok(saved)
    }

    pub async fn update_property(
        &self,
        user: &User,
        property_id: &str,
        input: UpdatePropertyInput,
    ) -> Result<Property, DomainError> {
        let mut property = load_owned_property(self.properties.as_ref(), user, property_id).await?;

        if let Some(name) = input.name {
            property.name = name.trim().to_string();
        }
        if let Some(address) = input.address {
            property.address = address.trim().to_string();
        }
        if let Some(city) = input.city {
            property.city = city.trim().to_string();
        }
        if let Some(country) = input.country {
            property.country = country.trim().to_string();
        }
        if let Some(description) = input.description {
            property.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(amenities) = input.amenities {
            property.amenities = resolve_amenities(self.amenities.as_ref(), amenities).await?;
        }
        if let Some(media_ids) = input.media_ids {
            property.media = self.collect_media(user, &property.media, media_ids).await?;
        }

        property.validate()?;
        self.properties.save(&property).await
    }

    /// DRAFT -> PUBLISHED under the configured policy. Already published is a no-op.
    pub async fn publish_property(
        &self,
        user: &User,
        property_id: &str,
    ) -> Result<Property, DomainError> {
        let mut property = load_owned_property(self.properties.as_ref(), user, property_id).await?;
        if property.status == PropertyStatus::Published {
            return Ok(property);
        }

        property.publish(&self.policy)?;
        let saved = self.properties.save(&property).await?;
        info!(property_id, "Published property");
        Ok(saved)
    }

    pub async fn unpublish_property(
        &self,
        user: &User,
        property_id: &str,
    ) -> Result<Property, DomainError> {
        let mut property = load_owned_property(self.properties.as_ref(), user, property_id).await?;
        if property.status == PropertyStatus::Draft {
            return Ok(property);
        }

        property.unpublish()?;
        let saved = self.properties.save(&property).await?;
        info!(property_id, "Unpublished property");
        Ok(saved)
    }

    pub async fn archive_property(
        &self,
        user: &User,
        property_id: &str,
    ) -> Result<Property, DomainError> {
        let mut property = load_owned_property(self.properties.as_ref(), user, property_id).await?;
        if property.status == PropertyStatus::Inactive {
            return Ok(property);
        }

        property.archive();
        let saved = self.properties.save(&property).await?;
        info!(property_id, "Archived property");
        Ok(saved)
    }

    pub async fn delete_property(&self, user: &User, property_id: &str) -> Result<(), DomainError> {
        load_owned_property(self.properties.as_ref(), user, property_id).await?;
        self.properties.delete(property_id).await
    }

    /// Published properties are visible to anyone; other states only to the owner.
    pub async fn get_property(
        &self,
        viewer: Option<&User>,
        property_id: &str,
    ) -> Result<Property, DomainError> {
        load_visible_property(self.properties.as_ref(), viewer, property_id).await
    }

    pub async fn list_owner_properties(&self, user: &User) -> Result<Vec<Property>, DomainError> {
        self.properties.get_by_owner(&user.id).await
    }
}
