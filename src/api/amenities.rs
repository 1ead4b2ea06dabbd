//! Read-only access to the amenity catalogs.
//!
//! Without `?name=` the global entries are listed; with it the single entry of
//! that name (case-insensitive) is returned, global or custom.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::domain::{DomainError, PropertyAmenity, RoomAmenity};
use crate::infrastructure::AppState;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub name: Option<String>,
}

pub async fn list_property_amenities(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<PropertyAmenity>>, DomainError> {
    match query.name {
        Some(name) => Ok(Json(
            state
                .property_amenities
                .get_by_name(&name)
                .await?
                .into_iter()
                .collect(),
        )),
        None => Ok(Json(state.property_amenities.list_global().await?)),
    }
}

pub async fn get_property_amenity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PropertyAmenity>, DomainError> {
    state
        .property_amenities
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Property amenity", &id))
}

pub async fn list_room_amenities(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<RoomAmenity>>, DomainError> {
    match query.name {
        Some(name) => Ok(Json(
            state
                .room_amenities
                .get_by_name(&name)
                .await?
                .into_iter()
                .collect(),
        )),
        None => Ok(Json(state.room_amenities.list_global().await?)),
    }
}

pub async fn get_room_amenity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomAmenity>, DomainError> {
    state
        .room_amenities
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Room amenity", &id))
}
