//! SeaORM implementation of the two amenity catalogs, plus the link
//! reconciliation and orphan collection used by the aggregate repositories.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::{
    Amenity, AmenityCatalog, AmenityScope, DomainError, PropertyAmenity, PropertyScope,
    RoomAmenity, RoomScope, amenity_name_key,
};
use crate::models::{property_amenity, property_amenity_link, room_amenity, room_amenity_link};

/// Incoming links keyed by amenity id. The first occurrence keeps its position,
/// a later non-empty override replaces the description.
fn wanted_links<S: AmenityScope>(incoming: &[Amenity<S>]) -> Vec<(String, Option<String>)> {
    let mut wanted: Vec<(String, Option<String>)> = Vec::with_capacity(incoming.len());
    for amenity in incoming {
        match wanted.iter_mut().find(|(id, _)| *id == amenity.id) {
            Some(entry) => {
                if amenity.custom_description.is_some() {
                    entry.1 = amenity.custom_description.clone();
                }
            }
            None => wanted.push((amenity.id.clone(), amenity.custom_description.clone())),
        }
    }
    wanted
}

fn missing_catalog_entry<S: AmenityScope>(amenity_id: &str) -> DomainError {
    DomainError::Consistency(format!(
        "{} {} is linked but has no catalog entry",
        S::LABEL,
        amenity_id
    ))
}

// ---------------------------------------------------------------------------
// Property links
// ---------------------------------------------------------------------------

/// Make the persisted links of `property_id` exactly `incoming`, then collect
/// any custom catalog entry that lost its last link.
pub(crate) async fn sync_property_amenity_links<C: ConnectionTrait>(
    conn: &C,
    property_id: &str,
    incoming: &[PropertyAmenity],
) -> Result<(), DomainError> {
    let persisted: HashMap<String, property_amenity_link::Model> =
        property_amenity_link::Entity::find()
            .filter(property_amenity_link::Column::PropertyId.eq(property_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| (link.amenity_id.clone(), link))
            .collect();

    let wanted = wanted_links(incoming);
    let now = chrono::Utc::now().to_rfc3339();

    for (amenity_id, custom_description) in &wanted {
        match persisted.get(amenity_id) {
            Some(link) => {
                if link.custom_description == *custom_description {
                    continue;
                }
                property_amenity_link::Entity::update_many()
                    .col_expr(
                        property_amenity_link::Column::CustomDescription,
                        Expr::value(custom_description.clone()),
                    )
                    .filter(property_amenity_link::Column::PropertyId.eq(property_id))
                    .filter(property_amenity_link::Column::AmenityId.eq(amenity_id.as_str()))
                    .exec(conn)
                    .await?;
            }
            None => {
                let exists = property_amenity::Entity::find_by_id(amenity_id.as_str())
                    .one(conn)
                    .await?
                    .is_some();
                if !exists {
                    return Err(missing_catalog_entry::<PropertyScope>(amenity_id));
                }

                let link = property_amenity_link::ActiveModel {
                    property_id: Set(property_id.to_string()),
                    amenity_id: Set(amenity_id.clone()),
                    custom_description: Set(custom_description.clone()),
                    created_at: Set(now.clone()),
                };
                property_amenity_link::Entity::insert(link)
                    .exec_without_returning(conn)
                    .await?;
            }
        }
    }

    let removed: Vec<String> = persisted
        .keys()
        .filter(|id| !wanted.iter().any(|(w, _)| w == *id))
        .cloned()
        .collect();

    if !removed.is_empty() {
        debug!(property_id, removed = ?removed, "Unlinking property amenities");
        property_amenity_link::Entity::delete_many()
            .filter(property_amenity_link::Column::PropertyId.eq(property_id))
            .filter(property_amenity_link::Column::AmenityId.is_in(removed.iter().cloned()))
            .exec(conn)
            .await?;
        purge_orphaned_property_amenities(conn, &removed).await?;
    }

    Ok(())
}

/// Delete the non-global entries among `candidates` that no link references.
pub(crate) async fn purge_orphaned_property_amenities<C: ConnectionTrait>(
    conn: &C,
    candidates: &[String],
) -> Result<u64, DomainError> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let result = property_amenity::Entity::delete_many()
        .filter(property_amenity::Column::Id.is_in(candidates.iter().cloned()))
        .filter(property_amenity::Column::IsGlobal.eq(false))
        .filter(
            property_amenity::Column::Id.not_in_subquery(
                Query::select()
                    .column(property_amenity_link::Column::AmenityId)
                    .from(property_amenity_link::Entity)
                    .to_owned(),
            ),
        )
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        debug!(
            deleted = result.rows_affected,
            "Collected orphaned property amenities"
        );
    }
    Ok(result.rows_affected)
}

/// Linked amenities of each property in `property_ids`, in link order.
pub(crate) async fn load_property_amenities<C: ConnectionTrait>(
    conn: &C,
    property_ids: &[String],
) -> Result<HashMap<String, Vec<PropertyAmenity>>, DomainError> {
    let mut by_property: HashMap<String, Vec<PropertyAmenity>> = HashMap::new();
    if property_ids.is_empty() {
        return Ok(by_property);
    }

    let rows = property_amenity_link::Entity::find()
        .filter(property_amenity_link::Column::PropertyId.is_in(property_ids.iter().cloned()))
        .order_by_asc(property_amenity_link::Column::CreatedAt)
        .find_also_related(property_amenity::Entity)
        .all(conn)
        .await?;

    for (link, entry) in rows {
        let entry = entry.ok_or_else(|| missing_catalog_entry::<PropertyScope>(&link.amenity_id))?;
        by_property
            .entry(link.property_id)
            .or_default()
            .push(PropertyAmenity::from(entry).with_custom_description(link.custom_description));
    }
    Ok(by_property)
}

// ---------------------------------------------------------------------------
// Room links
// ---------------------------------------------------------------------------

/// Make the persisted links of `room_id` exactly `incoming`.
///
/// Returns the ids of the unlinked entries. The caller collects orphans among
/// them once every room of the save has been reconciled, since another room
/// may pick up the same entry later in the pass.
pub(crate) async fn sync_room_amenity_links<C: ConnectionTrait>(
    conn: &C,
    room_id: &str,
    incoming: &[RoomAmenity],
) -> Result<Vec<String>, DomainError> {
    let persisted: HashMap<String, room_amenity_link::Model> = room_amenity_link::Entity::find()
        .filter(room_amenity_link::Column::RoomId.eq(room_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| (link.amenity_id.clone(), link))
        .collect();

    let wanted = wanted_links(incoming);
    let now = chrono::Utc::now().to_rfc3339();

    for (amenity_id, custom_description) in &wanted {
        match persisted.get(amenity_id) {
            Some(link) => {
                if link.custom_description == *custom_description {
                    continue;
                }
                room_amenity_link::Entity::update_many()
                    .col_expr(
                        room_amenity_link::Column::CustomDescription,
                        Expr::value(custom_description.clone()),
                    )
                    .filter(room_amenity_link::Column::RoomId.eq(room_id))
                    .filter(room_amenity_link::Column::AmenityId.eq(amenity_id.as_str()))
                    .exec(conn)
                    .await?;
            }
            None => {
                let exists = room_amenity::Entity::find_by_id(amenity_id.as_str())
                    .one(conn)
                    .await?
                    .is_some();
                if !exists {
                    return Err(missing_catalog_entry::<RoomScope>(amenity_id));
                }

                let link = room_amenity_link::ActiveModel {
                    room_id: Set(room_id.to_string()),
                    amenity_id: Set(amenity_id.clone()),
                    custom_description: Set(custom_description.clone()),
                    created_at: Set(now.clone()),
                };
                room_amenity_link::Entity::insert(link)
                    .exec_without_returning(conn)
                    .await?;
            }
        }
    }

    let removed: Vec<String> = persisted
        .keys()
        .filter(|id| !wanted.iter().any(|(w, _)| w == *id))
        .cloned()
        .collect();

    if !removed.is_empty() {
        debug!(room_id, removed = ?removed, "Unlinking room amenities");
        room_amenity_link::Entity::delete_many()
            .filter(room_amenity_link::Column::RoomId.eq(room_id))
            .filter(room_amenity_link::Column::AmenityId.is_in(removed.iter().cloned()))
            .exec(conn)
            .await?;
    }

    Ok(removed)
}

/// Delete the non-global entries among `candidates` that no link references.
pub(crate) async fn purge_orphaned_room_amenities<C: ConnectionTrait>(
    conn: &C,
    candidates: &[String],
) -> Result<u64, DomainError> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let result = room_amenity::Entity::delete_many()
        .filter(room_amenity::Column::Id.is_in(candidates.iter().cloned()))
        .filter(room_amenity::Column::IsGlobal.eq(false))
        .filter(
            room_amenity::Column::Id.not_in_subquery(
                Query::select()
                    .column(room_amenity_link::Column::AmenityId)
                    .from(room_amenity_link::Entity)
                    .to_owned(),
            ),
        )
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        debug!(
            deleted = result.rows_affected,
            "Collected orphaned room amenities"
        );
    }
    Ok(result.rows_affected)
}

pub(crate) async fn load_room_amenities<C: ConnectionTrait>(
    conn: &C,
    room_ids: &[String],
) -> Result<HashMap<String, Vec<RoomAmenity>>, DomainError> {
    let mut by_room: HashMap<String, Vec<RoomAmenity>> = HashMap::new();
    if room_ids.is_empty() {
        return Ok(by_room);
    }

    let rows = room_amenity_link::Entity::find()
        .filter(room_amenity_link::Column::RoomId.is_in(room_ids.iter().cloned()))
        .order_by_asc(room_amenity_link::Column::CreatedAt)
        .find_also_related(room_amenity::Entity)
        .all(conn)
        .await?;

    for (link, entry) in rows {
        let entry = entry.ok_or_else(|| missing_catalog_entry::<RoomScope>(&link.amenity_id))?;
        by_room
            .entry(link.room_id)
            .or_default()
            .push(RoomAmenity::from(entry).with_custom_description(link.custom_description));
    }
    Ok(by_room)
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

fn ensure_named<S: AmenityScope>(amenity: &Amenity<S>) -> Result<(), DomainError> {
    if amenity.name.trim().is_empty() {
        return Err(DomainError::Validation(format!(
            "{} name must not be empty",
            S::LABEL
        )));
    }
    Ok(())
}

/// SeaORM-based catalog of property amenities
pub struct SeaOrmPropertyAmenityCatalog {
    db: DatabaseConnection,
}

impl SeaOrmPropertyAmenityCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AmenityCatalog<PropertyScope> for SeaOrmPropertyAmenityCatalog {
    async fn save(&self, amenity: PropertyAmenity) -> Result<PropertyAmenity, DomainError> {
        ensure_named(&amenity)?;

        let saved = match property_amenity::Entity::find_by_id(amenity.id.as_str())
            .one(&self.db)
            .await?
        {
            Some(existing) => {
                let mut active: property_amenity::ActiveModel = existing.into();
                active.name = Set(amenity.name.trim().to_string());
                active.name_key = Set(amenity_name_key(&amenity.name));
                active.category = Set(amenity.category.clone());
                active.description = Set(amenity.description.clone());
                active.update(&self.db).await?
            }
            None => {
                let active = property_amenity::ActiveModel {
                    id: Set(amenity.id.clone()),
                    name: Set(amenity.name.trim().to_string()),
                    name_key: Set(amenity_name_key(&amenity.name)),
                    category: Set(amenity.category.clone()),
                    description: Set(amenity.description.clone()),
                    is_global: Set(amenity.is_global),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                };
                let model = active.insert(&self.db).await?;
                info!(id = %model.id, name = %model.name, "Created property amenity");
                model
            }
        };

        Ok(PropertyAmenity::from(saved).with_custom_description(amenity.custom_description))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let result: Result<(), DomainError> = async {
            property_amenity_link::Entity::delete_many()
                .filter(property_amenity_link::Column::AmenityId.eq(id))
                .exec(&txn)
                .await?;
            let deleted = property_amenity::Entity::delete_by_id(id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(DomainError::not_found("Property amenity", id));
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            let _ = txn.rollback().await;
            return Err(e);
        }
        txn.commit().await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PropertyAmenity>, DomainError> {
        Ok(property_amenity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(PropertyAmenity::from))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<PropertyAmenity>, DomainError> {
        let wanted = amenity_name_key(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        Ok(property_amenity::Entity::find()
            .filter(property_amenity::Column::NameKey.eq(wanted))
            .order_by_desc(property_amenity::Column::IsGlobal)
            .order_by_asc(property_amenity::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map(PropertyAmenity::from))
    }

    async fn list_global(&self) -> Result<Vec<PropertyAmenity>, DomainError> {
        Ok(property_amenity::Entity::find()
            .filter(property_amenity::Column::IsGlobal.eq(true))
            .order_by_asc(property_amenity::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(PropertyAmenity::from)
            .collect())
    }
}

/// SeaORM-based catalog of room amenities
pub struct SeaOrmRoomAmenityCatalog {
    db: DatabaseConnection,
}

impl SeaOrmRoomAmenityCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AmenityCatalog<RoomScope> for SeaOrmRoomAmenityCatalog {
    async fn save(&self, amenity: RoomAmenity) -> Result<RoomAmenity, DomainError> {
        ensure_named(&amenity)?;

        let saved = match room_amenity::Entity::find_by_id(amenity.id.as_str())
            .one(&self.db)
            .await?
        {
            Some(existing) => {
                let mut active: room_amenity::ActiveModel = existing.into();
                active.name = Set(amenity.name.trim().to_string());
                active.name_key = Set(amenity_name_key(&amenity.name));
                active.category = Set(amenity.category.clone());
                active.description = Set(amenity.description.clone());
                active.update(&self.db).await?
            }
            None => {
                let active = room_amenity::ActiveModel {
                    id: Set(amenity.id.clone()),
                    name: Set(amenity.name.trim().to_string()),
                    name_key: Set(amenity_name_key(&amenity.name)),
                    category: Set(amenity.category.clone()),
                    description: Set(amenity.description.clone()),
                    is_global: Set(amenity.is_global),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                };
                let model = active.insert(&self.db).await?;
                info!(id = %model.id, name = %model.name, "Created room amenity");
                model
            }
        };

        Ok(RoomAmenity::from(saved).with_custom_description(amenity.custom_description))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let result: Result<(), DomainError> = async {
            room_amenity_link::Entity::delete_many()
                .filter(room_amenity_link::Column::AmenityId.eq(id))
                .exec(&txn)
                .await?;
            let deleted = room_amenity::Entity::delete_by_id(id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(DomainError::not_found("Room amenity", id));
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            let _ = txn.rollback().await;
            return Err(e);
        }
        txn.commit().await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<RoomAmenity>, DomainError> {
        Ok(room_amenity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(RoomAmenity::from))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<RoomAmenity>, DomainError> {
        let wanted = amenity_name_key(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        Ok(room_amenity::Entity::find()
            .filter(room_amenity::Column::NameKey.eq(wanted))
            .order_by_desc(room_amenity::Column::IsGlobal)
            .order_by_asc(room_amenity::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map(RoomAmenity::from))
    }

    async fn list_global(&self) -> Result<Vec<RoomAmenity>, DomainError> {
        Ok(room_amenity::Entity::find()
            .filter(room_amenity::Column::IsGlobal.eq(true))
            .order_by_asc(room_amenity::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(RoomAmenity::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wanted_links_dedupes_and_keeps_latest_override() {
        let incoming = vec![
            RoomAmenity::reference("ra_tv"),
            RoomAmenity::reference("ra_wifi").with_custom_description(Some("slow".into())),
            RoomAmenity::reference("ra_wifi").with_custom_description(Some("fast".into())),
            RoomAmenity::reference("ra_wifi"),
        ];
        let wanted = wanted_links(&incoming);
        assert_eq!(
            wanted,
            vec![
                ("ra_tv".to_string(), None),
                ("ra_wifi".to_string(), Some("fast".to_string())),
            ]
        );
    }
}
