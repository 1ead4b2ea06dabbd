use sea_orm::*;

use crate::domain::amenity_name_key;
use crate::models::{property_amenity, room_amenity};

const PROPERTY_AMENITIES: &[(&str, &str, &str, &str)] = &[
    ("pa_wifi", "WiFi", "connectivity", "Wireless internet in common areas"),
    ("pa_parking", "Parking", "access", "On-site parking"),
    ("pa_pool", "Pool", "wellness", "Outdoor swimming pool"),
    ("pa_breakfast", "Breakfast", "food", "Breakfast served daily"),
    ("pa_reception_24h", "24h Reception", "service", "Front desk open around the clock"),
    ("pa_pets", "Pets allowed", "policy", "Pets welcome on request"),
];

const ROOM_AMENITIES: &[(&str, &str, &str, &str)] = &[
    ("ra_wifi", "WiFi", "connectivity", "Wireless internet in the room"),
    ("ra_air_conditioning", "Air conditioning", "comfort", "Individually controlled air conditioning"),
    ("ra_tv", "TV", "entertainment", "Flat-screen TV"),
    ("ra_minibar", "Minibar", "food", "Stocked minibar"),
    ("ra_private_bathroom", "Private bathroom", "comfort", "En-suite bathroom"),
    ("ra_balcony", "Balcony", "view", "Private balcony"),
];

/// Insert the global amenity catalogs. Existing rows are left untouched.
pub async fn seed_global_amenities(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    for (id, name, category, description) in PROPERTY_AMENITIES {
        let entry = property_amenity::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            name_key: Set(amenity_name_key(name)),
            category: Set(Some(category.to_string())),
            description: Set(Some(description.to_string())),
            is_global: Set(true),
            created_at: Set(now.clone()),
        };
        let res = property_amenity::Entity::insert(entry)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(property_amenity::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    for (id, name, category, description) in ROOM_AMENITIES {
        let entry = room_amenity::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            name_key: Set(amenity_name_key(name)),
            category: Set(Some(category.to_string())),
            description: Set(Some(description.to_string())),
            is_global: Set(true),
            created_at: Set(now.clone()),
        };
        let res = room_amenity::Entity::insert(entry)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(room_amenity::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Seeded {} property and {} room global amenities",
        PROPERTY_AMENITIES.len(),
        ROOM_AMENITIES.len()
    );
    Ok(())
}
