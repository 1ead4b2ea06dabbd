use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::domain::{DomainError, Property};
use crate::infrastructure::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub limit: Option<u64>,
}

pub async fn search_properties(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Property>>, DomainError> {
    let results = state
        .search_service
        .search(query.location, query.limit)
        .await?;
    Ok(Json(results))
}
