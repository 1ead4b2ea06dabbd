//! SeaORM implementation of RoomRepository
//!
//! A room is persisted together with its amenity links and its media. The
//! helpers here are also driven by the property repository when it reconciles
//! a property's room collection.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::amenity_repository::{
    load_room_amenities, purge_orphaned_room_amenities, sync_room_amenity_links,
};
use super::media_repository::{
    delete_media_rows, load_room_media, purge_media_files, retain_unreferenced_paths, sync_media,
};
use crate::domain::{DomainError, MediaParent, MediaStorage, Room, RoomRepository, RoomType};
use crate::models::{property, room, room_amenity_link};

/// What a room write left behind for the enclosing transaction to finish.
#[derive(Debug, Default)]
pub(crate) struct RoomChanges {
    /// Storage paths of media rows removed from the room
    removed_paths: Vec<String>,
    /// Custom amenities that lost a link and may now be orphaned
    amenity_candidates: Vec<String>,
}

impl RoomChanges {
    pub(crate) fn absorb(&mut self, other: RoomChanges) {
        self.removed_paths.extend(other.removed_paths);
        self.amenity_candidates.extend(other.amenity_candidates);
    }

    /// Collect orphaned custom amenities once all rooms of the write are
    /// reconciled. Returns the media paths left to purge.
    pub(crate) async fn finish<C: ConnectionTrait>(
        self,
        conn: &C,
    ) -> Result<Vec<String>, DomainError> {
        if !self.amenity_candidates.is_empty() {
            purge_orphaned_room_amenities(conn, &self.amenity_candidates).await?;
        }
        Ok(self.removed_paths)
    }
}

/// Insert or update one room row, then reconcile its links and media.
pub(crate) async fn upsert_room<C: ConnectionTrait>(
    conn: &C,
    incoming: &Room,
) -> Result<RoomChanges, DomainError> {
    let now = chrono::Utc::now().to_rfc3339();

    match room::Entity::find_by_id(incoming.id.as_str()).one(conn).await? {
        Some(existing) => {
            if existing.property_id != incoming.property_id {
                return Err(DomainError::Validation(format!(
                    "Room {} belongs to property {} and cannot be moved to {}",
                    incoming.id, existing.property_id, incoming.property_id
                )));
            }
            let mut active: room::ActiveModel = existing.into();
            active.room_type = Set(incoming.room_type.as_str().to_string());
            active.description = Set(incoming.description.clone());
            active.price = Set(incoming.price);
            active.capacity = Set(incoming.capacity);
            active.is_available = Set(incoming.is_available);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        None => {
            debug!(room_id = %incoming.id, property_id = %incoming.property_id, "Inserting room");
            let active = room::ActiveModel {
                id: Set(incoming.id.clone()),
                property_id: Set(incoming.property_id.clone()),
                room_type: Set(incoming.room_type.as_str().to_string()),
                description: Set(incoming.description.clone()),
                price: Set(incoming.price),
                capacity: Set(incoming.capacity),
                is_available: Set(incoming.is_available),
                created_at: Set(now.clone()),
                updated_at: Set(now),
            };
            active.insert(conn).await?;
        }
    }

    let amenity_candidates =
        sync_room_amenity_links(conn, &incoming.id, &incoming.amenities).await?;
    let removed_paths =
        sync_media(conn, &MediaParent::Room(incoming.id.clone()), &incoming.media).await?;
    Ok(RoomChanges {
        removed_paths,
        amenity_candidates,
    })
}

/// Delete a room row with its media rows and links.
pub(crate) async fn delete_room_rows<C: ConnectionTrait>(
    conn: &C,
    room_id: &str,
) -> Result<RoomChanges, DomainError> {
    let removed_paths = delete_media_rows(conn, &MediaParent::Room(room_id.to_string())).await?;

    let linked: Vec<String> = room_amenity_link::Entity::find()
        .filter(room_amenity_link::Column::RoomId.eq(room_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.amenity_id)
        .collect();
    if !linked.is_empty() {
        room_amenity_link::Entity::delete_many()
            .filter(room_amenity_link::Column::RoomId.eq(room_id))
            .exec(conn)
            .await?;
    }

    room::Entity::delete_by_id(room_id).exec(conn).await?;
    Ok(RoomChanges {
        removed_paths,
        amenity_candidates: linked,
    })
}

/// Turn room rows into fully hydrated rooms, loading links and media in batches.
pub(crate) async fn hydrate_rooms<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<room::Model>,
) -> Result<Vec<Room>, DomainError> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut amenities = load_room_amenities(conn, &ids).await?;
    let mut media = load_room_media(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let room_type: RoomType = row.room_type.parse().map_err(|_| {
                DomainError::Consistency(format!(
                    "Room {} has unknown persisted type '{}'",
                    row.id, row.room_type
                ))
            })?;
            Ok(Room {
                amenities: amenities.remove(&row.id).unwrap_or_default(),
                media: media.remove(&row.id).unwrap_or_default(),
                id: row.id,
                property_id: row.property_id,
                room_type,
                price: row.price,
                capacity: row.capacity,
                description: row.description,
                is_available: row.is_available,
            })
        })
        .collect()
}

/// SeaORM-based implementation of RoomRepository
pub struct SeaOrmRoomRepository {
    db: DatabaseConnection,
    storage: Arc<dyn MediaStorage>,
}

impl SeaOrmRoomRepository {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn MediaStorage>) -> Self {
        Self { db, storage }
    }
}

#[async_trait]
impl RoomRepository for SeaOrmRoomRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Room>, DomainError> {
        let Some(row) = room::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(hydrate_rooms(&self.db, vec![row]).await?.pop())
    }

    async fn get_by_property(&self, property_id: &str) -> Result<Vec<Room>, DomainError> {
        let rows = room::Entity::find()
            .filter(room::Column::PropertyId.eq(property_id))
            .order_by_asc(room::Column::CreatedAt)
            .all(&self.db)
            .await?;
        hydrate_rooms(&self.db, rows).await
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Room>, DomainError> {
        let rows = room::Entity::find()
            .join(JoinType::InnerJoin, room::Relation::Property.def())
            .filter(property::Column::OwnerId.eq(owner_id))
            .order_by_asc(room::Column::CreatedAt)
            .all(&self.db)
            .await?;
        hydrate_rooms(&self.db, rows).await
    }

    async fn save(&self, incoming: &Room) -> Result<Room, DomainError> {
        incoming.validate()?;

        let txn = self.db.begin().await?;
        let result: Result<Vec<String>, DomainError> = async {
            if property::Entity::find_by_id(incoming.property_id.as_str())
                .one(&txn)
                .await?
                .is_none()
            {
                return Err(DomainError::not_found("Property", &incoming.property_id));
            }
            let removed = upsert_room(&txn, incoming).await?.finish(&txn).await?;
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
        purge_media_files(self.storage.as_ref(), paths).await;

        self.get_by_id(&incoming.id).await?.ok_or_else(|| {
            DomainError::Internal(format!("Room {} vanished after save", incoming.id))
        })
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;
        let result: Result<Vec<String>, DomainError> = async {
            if room::Entity::find_by_id(id).one(&txn).await?.is_none() {
                return Err(DomainError::not_found("Room", id));
            }
            let removed = delete_room_rows(&txn, id).await?.finish(&txn).await?;
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

        info!(room_id = %id, "Deleted room");
        purge_media_files(self.storage.as_ref(), paths).await;
        Ok(())
    }
}
