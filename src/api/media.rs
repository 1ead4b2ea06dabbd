use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::{DomainError, Media, MediaParent};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;
use crate::services::UploadMediaInput;

pub async fn upload_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UploadMediaInput>,
) -> Result<(StatusCode, Json<Media>), DomainError> {
    let media = state.media_service.upload_media(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

pub async fn get_media(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Media>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    Ok(Json(
        state.media_service.get_media(viewer.as_ref(), &id).await?,
    ))
}

pub async fn delete_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    state.media_service.delete_media(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_property_media(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Media>>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    let parent = MediaParent::Property(id);
    Ok(Json(
        state
            .media_service
            .list_media(viewer.as_ref(), &parent)
            .await?,
    ))
}

pub async fn list_room_media(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Media>>, DomainError> {
    let viewer = user.map(|CurrentUser(u)| u);
    let parent = MediaParent::Room(id);
    Ok(Json(
        state
            .media_service
            .list_media(viewer.as_ref(), &parent)
            .await?,
    ))
}
