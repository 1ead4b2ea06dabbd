use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::{DomainError, Property};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;
use crate::services::{CreatePropertyInput, UpdatePropertyInput};

pub async fn list_my_properties(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Property>>, DomainError> {
    let properties = state.property_service.list_owner_properties(&user).await?;
    Ok(Json(properties))
}

pub async fn create_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePropertyInput>,
) -> Result<(StatusCode, Json<Property>), DomainError> {
    let property = state.property_service.create_property(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// Anonymous callers only see published listings
pub async fn get_property(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Property>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    let property = state
        .property_service
        .get_property(viewer.as_ref(), &id)
        .await?;
    Ok(Json(property))
}

pub async fn update_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePropertyInput>,
) -> Result<Json<Property>, DomainError> {
    let property = state
        .property_service
        .update_property(&user, &id, payload)
        .await?;
    Ok(Json(property))
}

pub async fn delete_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    state.property_service.delete_property(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Property>, DomainError> {
    Ok(Json(
        state.property_service.publish_property(&user, &id).await?,
    ))
}

pub async fn unpublish_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Property>, DomainError> {
    Ok(Json(
        state.property_service.unpublish_property(&user, &id).await?,
    ))
}

pub async fn archive_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Property>, DomainError> {
    Ok(Json(
        state.property_service.archive_property(&user, &id).await?,
    ))
}
