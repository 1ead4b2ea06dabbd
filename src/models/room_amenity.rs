use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::RoomAmenity;

/// Catalog of room-level amenities (global or owner-created)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room_amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// Folded form of `name` used for lookups
    pub name_key: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_global: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room_amenity_link::Entity")]
    Links,
}

impl Related<super::room_amenity_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoomAmenity {
    fn from(model: Model) -> Self {
        RoomAmenity::new(
            model.id,
            model.name,
            model.category,
            model.description,
            model.is_global,
        )
    }
}
