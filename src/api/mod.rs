pub mod amenities;
pub mod health;
pub mod media;
pub mod properties;
pub mod rooms;
pub mod search;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized => StatusCode::FORBIDDEN,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Storage(_) => StatusCode::BAD_GATEWAY,
            DomainError::Consistency(_) | DomainError::Database(_) | DomainError::Internal(_) => {
                tracing::error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Properties
        .route(
            "/properties",
            get(properties::list_my_properties).post(properties::create_property),
        )
        .route(
            "/properties/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route("/properties/:id/publish", post(properties::publish_property))
        .route(
            "/properties/:id/unpublish",
            post(properties::unpublish_property),
        )
        .route("/properties/:id/archive", post(properties::archive_property))
        .route(
            "/properties/:id/rooms",
            get(rooms::list_rooms).post(rooms::add_room),
        )
        .route("/properties/:id/media", get(media::list_property_media))
        // Rooms
        .route(
            "/rooms/:id",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/rooms/:id/amenities", post(rooms::add_room_amenity))
        .route(
            "/rooms/:id/amenities/:amenity_id",
            delete(rooms::remove_room_amenity),
        )
        .route("/rooms/:id/media", get(media::list_room_media))
        // Media
        .route("/media", post(media::upload_media))
        .route(
            "/media/:id",
            get(media::get_media).delete(media::delete_media),
        )
        // Amenity catalogs
        .route(
            "/amenities/property",
            get(amenities::list_property_amenities),
        )
        .route(
            "/amenities/property/:id",
            get(amenities::get_property_amenity),
        )
        .route("/amenities/room", get(amenities::list_room_amenities))
        .route("/amenities/room/:id", get(amenities::get_room_amenity))
        // Guest search
        .route("/search", get(search::search_properties))
        .with_state(state)
}
