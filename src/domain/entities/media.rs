use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Metadata of a stored media object. The bytes live in the object store,
/// reachable only through `storage_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub file_name: String,
    pub storage_path: String,
    pub file_type: Option<String>,
    pub description: Option<String>,
}

/// The single owner of a media row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MediaParent {
    Property(String),
    Room(String),
}

impl MediaParent {
    /// Builds the parent from two optional references, rejecting "both" and "neither".
    pub fn from_refs(
        property_id: Option<String>,
        room_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let property_id = property_id.filter(|s| !s.trim().is_empty());
        let room_id = room_id.filter(|s| !s.trim().is_empty());

        match (property_id, room_id) {
            (Some(p), None) => Ok(MediaParent::Property(p)),
            (None, Some(r)) => Ok(MediaParent::Room(r)),
            (Some(_), Some(_)) => Err(DomainError::validation(
                "Media cannot be associated with both a property and a room",
            )),
            (None, None) => Err(DomainError::validation(
                "Media must be associated with either a property or a room",
            )),
        }
    }

    pub fn property_id(&self) -> Option<&str> {
        match self {
            MediaParent::Property(id) => Some(id),
            MediaParent::Room(_) => None,
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            MediaParent::Room(id) => Some(id),
            MediaParent::Property(_) => None,
        }
    }
}

/// Raw upload request handed to the media repository.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
    pub property_id: Option<String>,
    pub room_id: Option<String>,
}

/// Object key for a new upload: id-prefixed so equal file names never collide.
pub fn storage_key(media_id: &str, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}-{}", media_id, safe.trim())
}
