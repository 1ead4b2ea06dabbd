use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub description: Option<String>,
    #[sea_orm(default_value = "DRAFT")]
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
    #[sea_orm(has_many = "super::media::Entity")]
    Media,
    #[sea_orm(has_many = "super::property_amenity_link::Entity")]
    AmenityLinks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl Related<super::property_amenity_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AmenityLinks.def()
    }
}

impl Related<super::property_amenity::Entity> for Entity {
    fn to() -> RelationDef {
        super::property_amenity_link::Relation::Amenity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::property_amenity_link::Relation::Property.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
