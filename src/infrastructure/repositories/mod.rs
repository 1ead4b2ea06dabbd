//! Repository implementations using SeaORM

pub mod amenity_repository;
pub mod media_repository;
pub mod property_repository;
pub mod room_repository;
pub mod user_repository;

pub use amenity_repository::{SeaOrmPropertyAmenityCatalog, SeaOrmRoomAmenityCatalog};
pub use media_repository::SeaOrmMediaRepository;
pub use property_repository::SeaOrmPropertyRepository;
pub use room_repository::SeaOrmRoomRepository;
pub use user_repository::SeaOrmUserRepository;
