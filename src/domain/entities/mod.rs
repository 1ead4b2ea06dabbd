//! In-memory aggregates consumed and produced by the repositories.

pub mod amenity;
pub mod media;
pub mod property;
pub mod room;
pub mod user;

pub use amenity::{
    Amenity, AmenityScope, PropertyAmenity, PropertyScope, RoomAmenity, RoomScope,
    amenity_name_key,
};
pub use media::{Media, MediaParent, MediaUpload, storage_key};
pub use property::{Property, PropertyStatus, PublishPolicy};
pub use room::{Room, RoomType};
pub use user::User;
