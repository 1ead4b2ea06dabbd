pub mod media;
pub mod property;
pub mod property_amenity;
pub mod property_amenity_link;
pub mod room;
pub mod room_amenity;
pub mod room_amenity_link;
pub mod user;
