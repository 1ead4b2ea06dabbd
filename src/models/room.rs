use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub property_id: String,
    pub room_type: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub capacity: i32,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
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
    #[sea_orm(has_many = "super::media::Entity")]
    Media,
    #[sea_orm(has_many = "super::room_amenity_link::Entity")]
    AmenityLinks,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl Related<super::room_amenity_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AmenityLinks.def()
    }
}

impl Related<super::room_amenity::Entity> for Entity {
    fn to() -> RelationDef {
        super::room_amenity_link::Relation::Amenity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::room_amenity_link::Relation::Room.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
