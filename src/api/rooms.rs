use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::{DomainError, Room};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;
use crate::services::{NewAmenityInput, RoomInput, UpdateRoomInput};

pub async fn list_rooms(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(property_id): Path<String>,
) -> Result<Json<Vec<Room>>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    Ok(Json(
        state
            .room_service
            .list_rooms(viewer.as_ref(), &property_id)
            .await?,
    ))
}

pub async fn add_room(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(property_id): Path<String>,
    Json(payload): Json<RoomInput>,
) -> Result<(StatusCode, Json<Room>), DomainError> {
    let room = state
        .room_service
        .add_room(&user, &property_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Room>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    Ok(Json(state.room_service.get_room(viewer.as_ref(), &id).await?))
}

pub async fn update_room(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoomInput>,
) -> Result<Json<Room>, DomainError> {
    Ok(Json(
        state.room_service.update_room(&user, &id, payload).await?,
    ))
}

pub async fn delete_room(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    state.room_service.delete_room(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_room_amenity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewAmenityInput>,
) -> Result<Json<Room>, DomainError> {
    Ok(Json(
        state
            .room_service
            .add_new_amenity(&user, &id, payload)
            .await?,
    ))
}

pub async fn remove_room_amenity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, amenity_id)): Path<(String, String)>,
) -> Result<Json<Room>, DomainError> {
    Ok(Json(
        state
            .room_service
            .remove_room_amenity(&user, &id, &amenity_id)
            .await?,
    ))
}
