use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property <-> amenity association carrying a per-listing description
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_amenity_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub property_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub amenity_id: String,
    pub custom_description: Option<String>,
    pub created_at: String,
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
        belongs_to = "super::property_amenity::Entity",
        from = "Column::AmenityId",
        to = "super::property_amenity::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Amenity,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::property_amenity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Amenity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
