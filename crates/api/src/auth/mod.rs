//! Authentication primitives.
//!
//! Identity is established upstream; this service only verifies the HS256
//! access tokens it is handed. See [`jwt`].

pub mod jwt;
