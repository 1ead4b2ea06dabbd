//! SeaORM implementation of MediaRepository
//!
//! Metadata rows live in the database; bytes live in a `MediaStorage`.
//! Physical objects are only ever deleted after the metadata change committed.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    DomainError, Media, MediaParent, MediaRepository, MediaStorage, MediaUpload, storage_key,
};
use crate::models::{media, property, room};

fn parent_condition(parent: &MediaParent) -> Condition {
    match parent {
        MediaParent::Property(id) => Condition::all()
            .add(media::Column::PropertyId.eq(id.as_str()))
            .add(media::Column::RoomId.is_null()),
        MediaParent::Room(id) => Condition::all()
            .add(media::Column::RoomId.eq(id.as_str()))
            .add(media::Column::PropertyId.is_null()),
    }
}

/// Make the media rows of `parent` exactly `incoming`.
///
/// Rows already attached elsewhere are re-attached to `parent`. Returns the
/// storage paths of the rows that were deleted; the caller decides, after
/// commit, which of them can be physically removed.
pub(crate) async fn sync_media<C: ConnectionTrait>(
    conn: &C,
    parent: &MediaParent,
    incoming: &[Media],
) -> Result<Vec<String>, DomainError> {
    let persisted: HashMap<String, media::Model> = media::Entity::find()
        .filter(parent_condition(parent))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id.clone(), m))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    for item in incoming {
        if !seen.insert(item.id.as_str()) {
            continue;
        }

        if let Some(existing) = persisted.get(&item.id) {
            let unchanged = existing.file_name == item.file_name
                && existing.description == item.description
                && (item.file_type.is_none() || existing.file_type == item.file_type);
            if !unchanged {
                let mut active: media::ActiveModel = existing.clone().into();
                active.file_name = Set(item.file_name.clone());
                active.description = Set(item.description.clone());
                if item.file_type.is_some() {
                    active.file_type = Set(item.file_type.clone());
                }
                active.update(conn).await?;
            }
            continue;
        }

        match media::Entity::find_by_id(item.id.as_str()).one(conn).await? {
            Some(elsewhere) => {
                debug!(media_id = %item.id, from = ?elsewhere.parent(), to = ?parent, "Re-attaching media");
                let mut active: media::ActiveModel = elsewhere.into();
                active.property_id = Set(parent.property_id().map(str::to_string));
                active.room_id = Set(parent.room_id().map(str::to_string));
                active.file_name = Set(item.file_name.clone());
                active.description = Set(item.description.clone());
                active.update(conn).await?;
            }
            None => {
                if item.storage_path.trim().is_empty() {
                    return Err(DomainError::Validation(format!(
                        "Media {} has no storage path",
                        item.id
                    )));
                }
                let active = media::ActiveModel {
                    id: Set(item.id.clone()),
                    property_id: Set(parent.property_id().map(str::to_string)),
                    room_id: Set(parent.room_id().map(str::to_string)),
                    file_name: Set(item.file_name.clone()),
                    file_type: Set(item.file_type.clone()),
                    storage_path: Set(item.storage_path.clone()),
                    description: Set(item.description.clone()),
                    inserted_at: Set(chrono::Utc::now().to_rfc3339()),
                };
                active.insert(conn).await?;
            }
        }
    }

    let removed: Vec<&media::Model> = persisted
        .values()
        .filter(|m| !seen.contains(m.id.as_str()))
        .collect();
    if removed.is_empty() {
        return Ok(Vec::new());
    }

    debug!(parent = ?parent, count = removed.len(), "Detaching media");
    media::Entity::delete_many()
        .filter(media::Column::Id.is_in(removed.iter().map(|m| m.id.clone())))
        .exec(conn)
        .await?;

    Ok(removed.into_iter().map(|m| m.storage_path.clone()).collect())
}

/// Delete every media row of `parent`, returning their storage paths.
pub(crate) async fn delete_media_rows<C: ConnectionTrait>(
    conn: &C,
    parent: &MediaParent,
) -> Result<Vec<String>, DomainError> {
    let rows = media::Entity::find()
        .filter(parent_condition(parent))
        .all(conn)
        .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    media::Entity::delete_many()
        .filter(parent_condition(parent))
        .exec(conn)
        .await?;
    Ok(rows.into_iter().map(|m| m.storage_path).collect())
}

/// Drop the paths that some surviving media row still points at.
pub(crate) async fn retain_unreferenced_paths<C: ConnectionTrait>(
    conn: &C,
    paths: Vec<String>,
) -> Result<Vec<String>, DomainError> {
    let mut unique: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_empty() && !unique.contains(&path) {
            unique.push(path);
        }
    }
    if unique.is_empty() {
        return Ok(unique);
    }

    let referenced: HashSet<String> = media::Entity::find()
        .filter(media::Column::StoragePath.is_in(unique.iter().cloned()))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.storage_path)
        .collect();

    unique.retain(|p| !referenced.contains(p));
    Ok(unique)
}

/// Physically remove objects whose metadata is already gone. Failures are
/// logged and swallowed.
pub(crate) async fn purge_media_files(storage: &dyn MediaStorage, paths: Vec<String>) {
    for path in paths {
        match storage.delete(&path).await {
            Ok(()) => debug!(path = %path, "Deleted media object"),
            Err(e) => warn!(path = %path, error = %e, "Failed to delete media object, leaving it orphaned"),
        }
    }
}

async fn load_media_grouped<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
    key: fn(&media::Model) -> Option<String>,
) -> Result<HashMap<String, Vec<Media>>, DomainError> {
    let rows = media::Entity::find()
        .filter(condition)
        .order_by_asc(media::Column::InsertedAt)
        .all(conn)
        .await?;

    let mut grouped: HashMap<String, Vec<Media>> = HashMap::new();
    for row in rows {
        if let Some(parent_id) = key(&row) {
            grouped.entry(parent_id).or_default().push(row.into());
        }
    }
    Ok(grouped)
}

pub(crate) async fn load_property_media<C: ConnectionTrait>(
    conn: &C,
    property_ids: &[String],
) -> Result<HashMap<String, Vec<Media>>, DomainError> {
    if property_ids.is_empty() {
        return Ok(HashMap::new());
    }
    load_media_grouped(
        conn,
        Condition::all()
            .add(media::Column::PropertyId.is_in(property_ids.iter().cloned()))
            .add(media::Column::RoomId.is_null()),
        |m| m.property_id.clone(),
    )
    .await
}

pub(crate) async fn load_room_media<C: ConnectionTrait>(
    conn: &C,
    room_ids: &[String],
) -> Result<HashMap<String, Vec<Media>>, DomainError> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }
    load_media_grouped(
        conn,
        Condition::all()
            .add(media::Column::RoomId.is_in(room_ids.iter().cloned()))
            .add(media::Column::PropertyId.is_null()),
        |m| m.room_id.clone(),
    )
    .await
}

/// SeaORM-based implementation of MediaRepository
pub struct SeaOrmMediaRepository {
    db: DatabaseConnection,
    storage: Arc<dyn MediaStorage>,
}

impl SeaOrmMediaRepository {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn MediaStorage>) -> Self {
        Self { db, storage }
    }

    async fn ensure_parent_exists(&self, parent: &MediaParent) -> Result<(), DomainError> {
        let found = match parent {
            MediaParent::Property(id) => property::Entity::find_by_id(id.as_str())
                .one(&self.db)
                .await?
                .is_some(),
            MediaParent::Room(id) => room::Entity::find_by_id(id.as_str())
                .one(&self.db)
                .await?
                .is_some(),
        };
        if found {
            return Ok(());
        }
        Err(match parent {
            MediaParent::Property(id) => DomainError::not_found("Property", id),
            MediaParent::Room(id) => DomainError::not_found("Room", id),
        })
    }
}

#[async_trait]
impl MediaRepository for SeaOrmMediaRepository {
    async fn upload(&self, upload: MediaUpload) -> Result<Media, DomainError> {
        // Parent shape is checked before anything touches storage
        let parent = MediaParent::from_refs(upload.property_id.clone(), upload.room_id.clone())?;
        if upload.file_name.trim().is_empty() {
            return Err(DomainError::validation("Media file name must not be empty"));
        }
        self.ensure_parent_exists(&parent).await?;

        let id = Uuid::new_v4().to_string();
        let key = storage_key(&id, &upload.file_name);
        let storage_path = self
            .storage
            .store(&key, &upload.bytes, &upload.content_type)
            .await?;

        let file_type = Some(upload.content_type.trim().to_string()).filter(|t| !t.is_empty());
        let active = media::ActiveModel {
            id: Set(id.clone()),
            property_id: Set(parent.property_id().map(str::to_string)),
            room_id: Set(parent.room_id().map(str::to_string)),
            file_name: Set(upload.file_name.trim().to_string()),
            file_type: Set(file_type),
            storage_path: Set(storage_path.clone()),
            description: Set(upload.description.clone()),
            inserted_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        match active.insert(&self.db).await {
            Ok(model) => {
                info!(media_id = %id, parent = ?parent, size = upload.bytes.len(), "Uploaded media");
                Ok(model.into())
            }
            Err(e) => {
                // Metadata never landed, so the object has no owner
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    warn!(path = %storage_path, error = %cleanup, "Failed to clean up media object after insert error");
                }
                Err(e.into())
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Media>, DomainError> {
        Ok(media::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Media::from))
    }

    async fn get_parent(&self, id: &str) -> Result<Option<MediaParent>, DomainError> {
        Ok(media::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .and_then(|m| m.parent()))
    }

    async fn list_by_parent(&self, parent: &MediaParent) -> Result<Vec<Media>, DomainError> {
        Ok(media::Entity::find()
            .filter(parent_condition(parent))
            .order_by_asc(media::Column::InsertedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Media::from)
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let result: Result<Vec<String>, DomainError> = async {
            let row = media::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| DomainError::not_found("Media", id))?;
            media::Entity::delete_many()
                .filter(media::Column::Id.eq(id))
                .exec(&txn)
                .await?;
            retain_unreferenced_paths(&txn, vec![row.storage_path]).await
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

        info!(media_id = %id, "Deleted media");
        purge_media_files(self.storage.as_ref(), paths).await;
        Ok(())
    }
}

