//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod availability_repo;
pub mod contact_repo;
pub mod event_repo;
pub mod favorite_repo;
pub mod notification_repo;
pub mod user_repo;

pub use availability_repo::AvailabilityRepo;
pub use contact_repo::ContactRepo;
pub use event_repo::EventRepo;
pub use favorite_repo::FavoriteRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;
