//! Turning amenity selections into catalog-backed amenities.

use serde::Deserialize;

use crate::domain::entities::amenity::push_unique;
use crate::domain::{Amenity, AmenityCatalog, AmenityScope, DomainError};

/// One amenity selection: either an existing catalog id, or a custom entry
/// identified by name (reused if the name already exists, created otherwise).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmenityInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub custom_description: Option<String>,
}

impl AmenityInput {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_custom_description(mut self, text: impl Into<String>) -> Self {
        self.custom_description = Some(text.into());
        self
    }
}

/// Resolve one selection against `catalog`.
///
/// A new custom entry is written to the catalog here, before any link can
/// reference it.
pub async fn resolve_amenity<S: AmenityScope>(
    catalog: &dyn AmenityCatalog<S>,
    input: AmenityInput,
) -> Result<Amenity<S>, DomainError> {
    let id = input.id.filter(|id| !id.trim().is_empty());
    let name = input.name.filter(|n| !n.trim().is_empty());

    let amenity = match (id, name) {
        (Some(id), _) => catalog
            .get_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(S::LABEL, &id))?,
        (None, Some(name)) => match catalog.get_by_name(&name).await? {
            Some(existing) => existing,
            None => {
                catalog
                    .save(Amenity::custom(
                        name.trim(),
                        input.category,
                        input.description,
                    ))
                    .await?
            }
        },
        (None, None) => {
            return Err(DomainError::Validation(format!(
                "A {} needs either an id or a name",
                S::LABEL
            )));
        }
    };

    Ok(amenity.with_custom_description(input.custom_description))
}

pub async fn resolve_amenities<S: AmenityScope>(
    catalog: &dyn AmenityCatalog<S>,
    inputs: Vec<AmenityInput>,
) -> Result<Vec<Amenity<S>>, DomainError> {
    let mut resolved: Vec<Amenity<S>> = Vec::with_capacity(inputs.len());
    for input in inputs {
        push_unique(&mut resolved, resolve_amenity(catalog, input).await?);
    }
    Ok(resolved)
}
