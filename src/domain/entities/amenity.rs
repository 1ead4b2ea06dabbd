//! Amenity catalog entries and their per-association overrides.
//!
//! Property and room amenities live in two parallel catalogs. The scope marker
//! keeps them apart at compile time, so a room amenity can never be linked to a
//! property by accident.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Marker trait for the catalog an amenity belongs to.
pub trait AmenityScope: Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Human readable label used in logs and error messages.
    const LABEL: &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyScope {}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomScope {}

impl AmenityScope for PropertyScope {
    const LABEL: &'static str = "property amenity";
}

impl AmenityScope for RoomScope {
    const LABEL: &'static str = "room amenity";
}

/// A catalog entry as seen through one association.
///
/// `description` is the generic catalog text; `custom_description` is the
/// override carried by the link row for this particular property or room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity<S> {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_global: bool,
    pub custom_description: Option<String>,
    #[serde(skip)]
    scope: PhantomData<S>,
}

pub type PropertyAmenity = Amenity<PropertyScope>;
pub type RoomAmenity = Amenity<RoomScope>;

impl<S: AmenityScope> Amenity<S> {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Option<String>,
        description: Option<String>,
        is_global: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description,
            is_global,
            custom_description: None,
            scope: PhantomData,
        }
    }

    /// Reference to an existing catalog entry by id only.
    ///
    /// Catalog fields stay empty; the repository resolves them on re-read.
    pub fn reference(id: impl Into<String>) -> Self {
        Self::new(id, String::new(), None, None, false)
    }

    /// A brand new owner-created entry with a freshly allocated id.
    pub fn custom(
        name: impl Into<String>,
        category: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self::new(Uuid::new_v4().to_string(), name, category, description, false)
    }

    pub fn global(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self::new(id, name, category, description, true)
    }

    pub fn with_custom_description(mut self, custom_description: Option<String>) -> Self {
        self.custom_description = custom_description;
        self
    }

    /// Text to show for this association: the override if any, else the catalog text.
    pub fn effective_description(&self) -> &str {
        self.custom_description
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// Key under which catalog names are compared.
///
/// Case is folded here and only here, with full Unicode rules, so "SAÚNA" and
/// "saúna" (composed or not) resolve to the same entry. Runs of whitespace
/// collapse to one space.
pub fn amenity_name_key(name: &str) -> String {
    name.nfc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Appends `amenity` unless an entry with the same id is already present.
pub(crate) fn push_unique<S: AmenityScope>(list: &mut Vec<Amenity<S>>, amenity: Amenity<S>) {
    match list.iter_mut().find(|a| a.id == amenity.id) {
        Some(existing) => {
            if amenity.custom_description.is_some() {
                existing.custom_description = amenity.custom_description;
            }
        }
        None => list.push(amenity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_amenities_get_distinct_ids_and_are_not_global() {
        let a = RoomAmenity::custom("Sauna", Some("wellness".into()), None);
        let b = RoomAmenity::custom("Sauna", Some("wellness".into()), None);
        assert_ne!(a.id, b.id);
        assert!(!a.is_global);
    }

    #[test]
    fn name_key_folds_unicode_case_and_spacing() {
        assert_eq!(amenity_name_key("  SAÚNA "), "saúna");
        assert_eq!(amenity_name_key("Sau\u{301}na"), amenity_name_key("SAÚNA"));
        assert_eq!(amenity_name_key("Hot\t  TUB"), "hot tub");
        assert_eq!(amenity_name_key("   "), "");
    }

    #[test]
    fn effective_description_prefers_override() {
        let a = PropertyAmenity::global("pa_wifi", "WiFi", None, Some("Wireless".into()));
        assert_eq!(a.effective_description(), "Wireless");
        let a = a.with_custom_description(Some("Fibre, 1 Gbit".into()));
        assert_eq!(a.effective_description(), "Fibre, 1 Gbit");
    }

    #[test]
    fn push_unique_keeps_one_entry_per_id() {
        let mut list = Vec::new();
        push_unique(&mut list, PropertyAmenity::reference("pa_wifi"));
        push_unique(
            &mut list,
            PropertyAmenity::reference("pa_wifi").with_custom_description(Some("fast".into())),
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].custom_description.as_deref(), Some("fast"));
    }
}
