//! Media Service - uploads and removals on behalf of the owner

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::sync::Arc;

use super::{load_owned_property, load_owned_room, load_visible_property};
use crate::domain::{
    DomainError, Media, MediaParent, MediaRepository, MediaUpload, PropertyRepository,
    RoomRepository, User,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadMediaInput {
    pub file_name: String,
    pub content_type: Option<String>,
    /// File bytes, base64 encoded. A `data:<type>;base64,` prefix is accepted.
    pub data: String,
    pub description: Option<String>,
    pub property_id: Option<String>,
    pub room_id: Option<String>,
}

/// Decode a base64 payload, tolerating a data-URL prefix.
/// Returns the bytes and the content type named by the prefix, if any.
pub fn decode_payload(data: &str) -> Result<(Vec<u8>, Option<String>), DomainError> {
    let data = data.trim();
    let (encoded, content_type) = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| DomainError::validation("Malformed data URL"))?;
            let mime = header
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (body, mime)
        }
        None => (data, None),
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| DomainError::Validation(format!("Invalid base64 payload: {}", e)))?;
    if bytes.is_empty() {
        return Err(DomainError::validation("Media payload is empty"));
    }
    Ok((bytes, content_type))
}

pub struct MediaService {
    media: Arc<dyn MediaRepository>,
    properties: Arc<dyn PropertyRepository>,
    rooms: Arc<dyn RoomRepository>,
}

impl MediaService {
    pub fn new(
        media: Arc<dyn MediaRepository>,
        properties: Arc<dyn PropertyRepository>,
        rooms: Arc<dyn RoomRepository>,
    ) -> Self {
        Self {
            media,
            properties,
            rooms,
        }
    }

    async fn ensure_parent_owned(&self, user: &User, parent: &MediaParent) -> Result<(), DomainError> {
        match parent {
            MediaParent::Property(id) => {
                load_owned_property(self.properties.as_ref(), user, id).await?;
            }
            MediaParent::Room(id) => {
                load_owned_room(self.properties.as_ref(), self.rooms.as_ref(), user, id).await?;
            }
        }
        Ok(())
    }

    /// Media follows the visibility of the property it hangs off.
    async fn ensure_parent_visible(
        &self,
        viewer: Option<&User>,
        parent: &MediaParent,
    ) -> Result<(), DomainError> {
        match parent {
            MediaParent::Property(id) => {
                load_visible_property(self.properties.as_ref(), viewer, id).await?;
            }
            MediaParent::Room(id) => {
                let room = self
                    .rooms
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Room", id))?;
                load_visible_property(self.properties.as_ref(), viewer, &room.property_id)
                    .await
                    .map_err(|e| match e {
                        DomainError::NotFound(_) => DomainError::not_found("Room", id),
                        other => other,
                    })?;
            }
        }
        Ok(())
    }

    pub async fn upload_media(
        &self,
        user: &User,
        input: UploadMediaInput,
    ) -> Result<Media, DomainError> {
        let parent = MediaParent::from_refs(input.property_id.clone(), input.room_id.clone())?;
        self.ensure_parent_owned(user, &parent).await?;

        let (bytes, data_url_type) = decode_payload(&input.data)?;
        let content_type = input
            .content_type
            .filter(|t| !t.trim().is_empty())
            .or(data_url_type)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        self.media
            .upload(MediaUpload {
                file_name: input.file_name,
                content_type,
                bytes,
                description: input.description,
                property_id: parent.property_id().map(str::to_string),
                room_id: parent.room_id().map(str::to_string),
            })
            .await
    }

    pub async fn delete_media(&self, user: &User, media_id: &str) -> Result<(), DomainError> {
        let parent = self
            .media
            .get_parent(media_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Media", media_id))?;
        self.ensure_parent_owned(user, &parent).await?;
        self.media.delete(media_id).await
    }

    pub async fn get_media(
        &self,
        viewer: Option<&User>,
        media_id: &str,
    ) -> Result<Media, DomainError> {
        let media = self
            .media
            .get_by_id(media_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Media", media_id))?;
        let parent = self.media.get_parent(media_id).await?.ok_or_else(|| {
            DomainError::Consistency(format!("Media {} has no parent", media_id))
        })?;

        self.ensure_parent_visible(viewer, &parent)
            .await
            .map_err(|e| match e {
                DomainError::NotFound(_) => DomainError::not_found("Media", media_id),
                other => other,
            })?;
        Ok(media)
    }

    pub async fn list_media(
        &self,
        viewer: Option<&User>,
        parent: &MediaParent,
    ) -> Result<Vec<Media>, DomainError> {
        self.ensure_parent_visible(viewer, parent).await?;
        self.media.list_by_parent(parent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_base64() {
        let (bytes, ty) = decode_payload("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(ty, None);
    }

    #[test]
    fn decode_data_url_keeps_content_type() {
        let (bytes, ty) = decode_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(ty.as_deref(), Some("image/png"));
    }

    #[test]
    fn decode_rejects_garbage_and_empty() {
        assert!(matches!(
            decode_payload("not base64!!"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(decode_payload(""), Err(DomainError::Validation(_))));
    }
}
