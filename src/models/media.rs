use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Media, MediaParent};

/// Media metadata. Exactly one of `property_id` / `room_id` is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub property_id: Option<String>,
    pub room_id: Option<String>,
    pub file_name: String,
    pub file_type: Option<String>,
    pub storage_path: String,
    pub description: Option<String>,
    pub inserted_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Property,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Room,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn parent(&self) -> Option<MediaParent> {
        match (&self.property_id, &self.room_id) {
            (Some(p), None) => Some(MediaParent::Property(p.clone())),
            (None, Some(r)) => Some(MediaParent::Room(r.clone())),
            _ => None,
        }
    }
}

impl From<Model> for Media {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            file_name: model.file_name,
            storage_path: model.storage_path,
            file_type: model.file_type,
            description: model.description,
        }
    }
}
