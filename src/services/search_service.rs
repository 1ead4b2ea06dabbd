//! Search Service - guest view over published listings

use std::sync::Arc;

use crate::domain::{DomainError, Property, PropertyRepository, PropertySearch};

pub struct SearchService {
    properties: Arc<dyn PropertyRepository>,
}

impl SearchService {
    pub fn new(properties: Arc<dyn PropertyRepository>) -> Self {
        Self { properties }
    }

    /// Published properties, newest first. `location` is matched as a
    /// substring of name, address, city, country and description.
    pub async fn search(
        &self,
        location: Option<String>,
        limit: Option<u64>,
    ) -> Result<Vec<Property>, DomainError> {
        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        tracing::debug!(location = ?location, "Searching published properties");

        self.properties
            .search_published(PropertySearch { location, limit })
            .await
    }
}
