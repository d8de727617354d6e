pub mod auth;
pub mod calendar;
