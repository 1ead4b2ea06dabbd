use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use super::amenity::{RoomAmenity, push_unique};
use super::media::Media;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Single,
    Double,
    Suite,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "SINGLE",
            RoomType::Double => "DOUBLE",
            RoomType::Suite => "SUITE",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, collapse whitespace/underscores/dashes and drop diacritics.
fn normalize_alias(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_alias(s).as_str() {
            "single" | "singola" | "singolo" | "simple" | "individual" | "individuelle"
            | "einzel" | "einzelzimmer" | "sgl" => Ok(RoomType::Single),
            "double" | "doppia" | "doppio" | "matrimoniale" | "doble" | "doppelzimmer"
            | "twin" | "dbl" => Ok(RoomType::Double),
            "suite" | "junior suite" | "suite junior" => Ok(RoomType::Suite),
            _ => Err(DomainError::Validation(format!("Unknown room type '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub property_id: String,
    pub room_type: RoomType,
    pub price: f64,
    pub capacity: i32,
    pub description: Option<String>,
    pub is_available: bool,
    pub amenities: Vec<RoomAmenity>,
    pub media: Vec<Media>,
}

impl Room {
    /// Creates an available room with a fresh id. Price and capacity must be positive.
    pub fn new(
        property_id: impl Into<String>,
        room_type: RoomType,
        price: f64,
        capacity: i32,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let room = Self {
            id: Uuid::new_v4().to_string(),
            property_id: property_id.into(),
            room_type,
            price,
            capacity,
            description,
            is_available: true,
            amenities: Vec::new(),
            media: Vec::new(),
        };
        room.validate()?;
        Ok(room)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(DomainError::validation("Price must be positive"));
        }
        if self.capacity <= 0 {
            return Err(DomainError::validation("Capacity must be positive"));
        }
        Ok(())
    }

    pub fn update_price(&mut self, new_price: f64) -> Result<(), DomainError> {
        if !(new_price.is_finite() && new_price > 0.0) {
            return Err(DomainError::validation("Price must be positive"));
        }
        self.price = new_price;
        Ok(())
    }

    pub fn update_capacity(&mut self, capacity: i32) -> Result<(), DomainError> {
        if capacity <= 0 {
            return Err(DomainError::validation("Capacity must be positive"));
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn set_available(&mut self, available: bool) {
        self.is_available = available;
    }

    pub fn add_amenity(&mut self, amenity: RoomAmenity) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_accepts_aliases_case_insensitively() {
        assert_eq!("SINGLE".parse::<RoomType>().unwrap(), RoomType::Single);
        assert_eq!(" singola ".parse::<RoomType>().unwrap(), RoomType::Single);
        assert_eq!("Matrimoniale".parse::<RoomType>().unwrap(), RoomType::Double);
        assert_eq!("junior_suite".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert_eq!("Suíte".parse::<RoomType>().unwrap(), RoomType::Suite);
    }

    #[test]
    fn room_type_rejects_unknown_alias() {
        assert!(matches!(
            "penthouse".parse::<RoomType>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn new_room_rejects_non_positive_price_and_capacity() {
        assert!(Room::new("p", RoomType::Single, 0.0, 1, None).is_err());
        assert!(Room::new("p", RoomType::Single, -5.0, 1, None).is_err());
        assert!(Room::new("p", RoomType::Single, f64::NAN, 1, None).is_err());
        assert!(Room::new("p", RoomType::Single, 50.0, 0, None).is_err());
        let room = Room::new("p", RoomType::Double, 80.0, 2, None).unwrap();
        assert!(room.is_available);
    }

    #[test]
    fn update_price_keeps_old_value_on_error() {
        let mut room = Room::new("p", RoomType::Single, 50.0, 1, None).unwrap();
        assert!(room.update_price(0.0).is_err());
        assert_eq!(room.price, 50.0);
        room.update_price(65.5).unwrap();
        assert_eq!(room.price, 65.5);
    }

    #[test]
    fn amenities_are_deduplicated_and_removable() {
        let mut room = Room::new("p", RoomType::Single, 50.0, 1, None).unwrap();
        room.add_amenity(RoomAmenity::reference("ra_tv"));
        room.add_amenity(RoomAmenity::reference("ra_tv"));
        assert_eq!(room.amenities.len(), 1);
        assert!(room.remove_amenity("ra_tv"));
        assert!(!room.remove_amenity("ra_tv"));
    }
}
