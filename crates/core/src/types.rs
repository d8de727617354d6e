//! Primitive aliases shared by every crate in the workspace.

/// Primary keys for events, windows and edge records (PostgreSQL BIGSERIAL).
pub type DbId = i64;

/// Identity of a musician or venue account. Issued by the external auth
/// provider and carried in the JWT `sub` claim.
pub type UserId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
