//! SeaORM implementation of PropertyRepository
//!
//! `save` reconciles the whole aggregate inside one transaction:
//! scalar fields, amenity links, property media, then the room collection
//! (each room with its own links and media). Media objects removed along the
//! way are physically deleted only once the transaction has committed.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use super::amenity_repository::{
    load_property_amenities, purge_orphaned_property_amenities, sync_property_amenity_links,
};
use super::media_repository::{
    delete_media_rows, load_property_media, purge_media_files, retain_unreferenced_paths,
    sync_media,
};
use super::room_repository::{RoomChanges, delete_room_rows, hydrate_rooms, upsert_room};
use crate::domain::{
    DomainError, MediaParent, MediaStorage, Property, PropertyRepository, PropertySearch,
    PropertyStatus, Room,
};
use crate::models::{property, property_amenity_link, room, user};

/// Result cap for a plain listing of published properties
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;
/// Result cap when a location filter is given
pub const LOCATION_SEARCH_LIMIT: u64 = 50;

async fn hydrate_properties<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<property::Model>,
) -> Result<Vec<Property>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = rows.iter().map(|p| p.id.clone()).collect();

    let room_rows = room::Entity::find()
        .filter(room::Column::PropertyId.is_in(ids.iter().cloned()))
        .order_by_asc(room::Column::CreatedAt)
        .all(conn)
        .await?;
    let mut rooms: HashMap<String, Vec<Room>> = HashMap::new();
    for r in hydrate_rooms(conn, room_rows).await? {
        rooms.entry(r.property_id.clone()).or_default().push(r);
    }

    let mut amenities = load_property_amenities(conn, &ids).await?;
    let mut media = load_property_media(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let status: PropertyStatus = row.status.parse().map_err(|_| {
                DomainError::Consistency(format!(
                    "Property {} has unknown persisted status '{}'",
                    row.id, row.status
                ))
            })?;
            Ok(Property {
                rooms: rooms.remove(&row.id).unwrap_or_default(),
                amenities: amenities.remove(&row.id).unwrap_or_default(),
                media: media.remove(&row.id).unwrap_or_default(),
                id: row.id,
                owner_id: row.owner_id,
                name: row.name,
                address: row.address,
                city: row.city,
                country: row.country,
                description: row.description,
                status,
            })
        })
        .collect()
}

/// Insert the property row, or update its scalar fields in place.
async fn upsert_property_row<C: ConnectionTrait>(
    conn: &C,
    incoming: &Property,
) -> Result<(), DomainError> {
    let now = chrono::Utc::now().to_rfc3339();

    match property::Entity::find_by_id(incoming.id.as_str()).one(conn).await? {
        Some(existing) => {
            if existing.owner_id != incoming.owner_id {
                return Err(DomainError::Validation(format!(
                    "Owner of property {} cannot be changed",
                    incoming.id
                )));
            }
            let mut active: property::ActiveModel = existing.into();
            active.name = Set(incoming.name.clone());
            active.address = Set(incoming.address.clone());
            active.city = Set(incoming.city.clone());
            active.country = Set(incoming.country.clone());
            active.description = Set(incoming.description.clone());
            active.status = Set(incoming.status.as_str().to_string());
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        None => {
            if user::Entity::find_by_id(incoming.owner_id.as_str())
                .one(conn)
                .await?
                .is_none()
            {
                return Err(DomainError::not_found("User", &incoming.owner_id));
            }
            debug!(property_id = %incoming.id, owner_id = %incoming.owner_id, "Inserting property");
            let active = property::ActiveModel {
                id: Set(incoming.id.clone()),
                owner_id: Set(incoming.owner_id.clone()),
                name: Set(incoming.name.clone()),
                address: Set(incoming.address.clone()),
                city: Set(incoming.city.clone()),
                country: Set(incoming.country.clone()),
                description: Set(incoming.description.clone()),
                status: Set(incoming.status.as_str().to_string()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
            };
            active.insert(conn).await?;
        }
    }
    Ok(())
}

/// Make the persisted rooms of the property exactly `incoming.rooms`.
///
/// Orphaned room amenities are collected only after every room is written,
/// so an entry moved between two rooms of the same save survives.
async fn sync_rooms<C: ConnectionTrait>(
    conn: &C,
    incoming: &Property,
) -> Result<Vec<String>, DomainError> {
    let persisted: HashSet<String> = room::Entity::find()
        .select_only()
        .column(room::Column::Id)
        .filter(room::Column::PropertyId.eq(incoming.id.as_str()))
        .into_tuple::<String>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    let mut changes = RoomChanges::default();
    let mut kept: HashSet<&str> = HashSet::new();

    for r in &incoming.rooms {
        if !kept.insert(r.id.as_str()) {
            return Err(DomainError::Validation(format!(
                "Room {} appears twice in property {}",
                r.id, incoming.id
            )));
        }
        if r.property_id != incoming.id {
            return Err(DomainError::Validation(format!(
                "Room {} does not belong to property {}",
                r.id, incoming.id
            )));
        }
        changes.absorb(upsert_room(conn, r).await?);
    }

    for room_id in persisted.iter().filter(|id| !kept.contains(id.as_str())) {
        debug!(property_id = %incoming.id, room_id = %room_id, "Removing room no longer in property");
        changes.absorb(delete_room_rows(conn, room_id).await?);
    }

    changes.finish(conn).await
}

/// SeaORM-based implementation of PropertyRepository
pub struct SeaOrmPropertyRepository {
    db: DatabaseConnection,
    storage: Arc<dyn MediaStorage>,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn MediaStorage>) -> Self {
        Self { db, storage }
    }
}

#[async_trait]
impl PropertyRepository for SeaOrmPropertyRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Property>, DomainError> {
        let Some(row) = property::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(hydrate_properties(&self.db, vec![row]).await?.pop())
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, DomainError> {
        let rows = property::Entity::find()
            .filter(property::Column::OwnerId.eq(owner_id))
            .order_by_desc(property::Column::CreatedAt)
            .all(&self.db)
            .await?;
        hydrate_properties(&self.db, rows).await
    }

    async fn search_published(
        &self,
        filter: PropertySearch,
    ) -> Result<Vec<Property>, DomainError> {
        let mut query = property::Entity::find()
            .filter(property::Column::Status.eq(PropertyStatus::Published.as_str()));

        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let cap = match location {
            Some(location) => {
                query = query.filter(
                    Condition::any()
                        .add(property::Column::Name.contains(location))
                        .add(property::Column::Address.contains(location))
                        .add(property::Column::City.contains(location))
                        .add(property::Column::Country.contains(location))
                        .add(property::Column::Description.contains(location)),
                );
                LOCATION_SEARCH_LIMIT
            }
            None => DEFAULT_SEARCH_LIMIT,
        };
        let limit = filter.limit.unwrap_or(cap).clamp(1, cap);

        let rows = query
            .order_by_desc(property::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        hydrate_properties(&self.db, rows).await
    }

    async fn save(&self, incoming: &Property) -> Result<Property, DomainError> {
        incoming.validate()?;

        let txn = self.db.begin().await?;
        let result: Result<Vec<String>, DomainError> = async {
            upsert_property_row(&txn, incoming).await?;
            sync_property_amenity_links(&txn, &incoming.id, &incoming.amenities).await?;

            let mut removed = sync_media(
                &txn,
                &MediaParent::Property(incoming.id.clone()),
                &incoming.media,
            )
            .await?;
            removed.extend(sync_rooms(&txn, incoming).await?);

            retain_unreferenced_paths(&txn, removed).await
        }
        .await;

        let paths = match result {
            Ok(paths) => paths,
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(e);
            }
        };
        txn.commit().await?;

        info!(
            property_id = %incoming.id,
            status = %incoming.status,
            rooms = incoming.rooms.len(),
            "Saved property"
        );
        purge_media_files(self.storage.as_ref(), paths).await;

        self.get_by_id(&incoming.id).await?.ok_or_else(|| {
            DomainError::Internal(format!("Property {} vanished after save", incoming.id))
        })
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;
        let result: Result<Vec<String>, DomainError> = async {
            if property::Entity::find_by_id(id).one(&txn).await?.is_none() {
                return Err(DomainError::not_found("Property", id));
            }

            let room_ids: Vec<String> = room::Entity::find()
                .select_only()
                .column(room::Column::Id)
                .filter(room::Column::PropertyId.eq(id))
                .into_tuple::<String>()
                .all(&txn)
                .await?;

            let mut changes = RoomChanges::default();
            for room_id in &room_ids {
                changes.absorb(delete_room_rows(&txn, room_id).await?);
            }
            let mut removed = changes.finish(&txn).await?;
            removed.extend(delete_media_rows(&txn, &MediaParent::Property(id.to_string())).await?);

            let linked: Vec<String> = property_amenity_link::Entity::find()
                .filter(property_amenity_link::Column::PropertyId.eq(id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|link| link.amenity_id)
                .collect();
            property_amenity_link::Entity::delete_many()
                .filter(property_amenity_link::Column::PropertyId.eq(id))
                .exec(&txn)
                .await?;
            purge_orphaned_property_amenities(&txn, &linked).await?;

            property::Entity::delete_by_id(id).exec(&txn).await?;
            retain_unreferenced_paths(&txn, removed).await
        }
        .await;

        let paths = match result {
            Ok(paths) => paths,
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(e);
            }
        };
        txn.commit().await?;

        info!(property_id = %id, media_objects = paths.len(), "Deleted property");
        purge_media_files(self.storage.as_ref(), paths).await;
        Ok(())
    }
}
